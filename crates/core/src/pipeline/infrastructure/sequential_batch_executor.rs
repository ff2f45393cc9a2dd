use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::batch_executor::{record_outcome, BatchExecutor, BatchJob, BatchOutcome};
use crate::pipeline::locate_and_align_use_case::LocateAndAlignUseCase;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Matches jobs one after another on the calling thread.
#[derive(Debug, Default)]
pub struct SequentialBatchExecutor;

impl BatchExecutor for SequentialBatchExecutor {
    fn execute(
        &self,
        use_case: Arc<LocateAndAlignUseCase>,
        jobs: Vec<BatchJob>,
        logger: &mut dyn PipelineLogger,
    ) -> Vec<BatchOutcome> {
        let total = jobs.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, job) in jobs.into_iter().enumerate() {
            let started = Instant::now();
            let result = use_case.execute(&job.transcript, job.target);
            let outcome = BatchOutcome {
                name: job.name,
                result,
            };
            record_outcome(logger, &outcome, started.elapsed().as_secs_f64() * 1000.0);
            outcomes.push(outcome);
            logger.progress(i + 1, total);
        }

        outcomes
    }
}
