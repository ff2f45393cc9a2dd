use std::sync::Arc;

use crate::matching::domain::match_report::MatchReport;
use crate::text::domain::transcript::Transcript;

use super::locate_and_align_use_case::{LocateAndAlignUseCase, MatchError, VerseTarget};
use super::pipeline_logger::PipelineLogger;

/// One transcript to match, labelled for reporting (usually its file name).
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub name: String,
    pub transcript: Transcript,
    pub target: Option<VerseTarget>,
}

impl BatchJob {
    pub fn new(name: impl Into<String>, transcript: Transcript) -> Self {
        Self {
            name: name.into(),
            transcript,
            target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub name: String,
    pub result: Result<MatchReport, MatchError>,
}

/// Runs a list of jobs through one shared use case.
///
/// This is a port; infrastructure provides sequential and threaded
/// implementations. Outcomes always come back in job order.
pub trait BatchExecutor: Send {
    fn execute(
        &self,
        use_case: Arc<LocateAndAlignUseCase>,
        jobs: Vec<BatchJob>,
        logger: &mut dyn PipelineLogger,
    ) -> Vec<BatchOutcome>;
}

/// Reports per-job metrics shared by every executor.
pub(crate) fn record_outcome(
    logger: &mut dyn PipelineLogger,
    outcome: &BatchOutcome,
    duration_ms: f64,
) {
    logger.timing("match", duration_ms);
    match &outcome.result {
        Ok(report) => {
            logger.metric("score", report.score());
            if report.verse().is_resolved() {
                logger.metric("accuracy", report.accuracy());
            } else {
                logger.metric("unresolved", 1.0);
            }
        }
        Err(e) => logger.info(&format!("{}: {e}", outcome.name)),
    }
}
