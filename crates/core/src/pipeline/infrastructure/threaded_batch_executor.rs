use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use crate::pipeline::batch_executor::{record_outcome, BatchExecutor, BatchJob, BatchOutcome};
use crate::pipeline::locate_and_align_use_case::{LocateAndAlignUseCase, MatchError};
use crate::pipeline::pipeline_logger::PipelineLogger;

const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// A finished job tagged with its submission slot and elapsed time.
type Completed = (usize, BatchOutcome, f64);

/// Matches jobs on a fixed pool of worker threads.
///
/// Layout: `feeder → workers (N) → main [log/collect]`
///
/// Every worker shares one `Arc` of the use case, whose index is read-only.
/// Outcomes are put back into submission order before returning. A job whose
/// worker panicked still gets an outcome, failing with
/// [`MatchError::Interrupted`].
pub struct ThreadedBatchExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedBatchExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadedBatchExecutor {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }
}

impl BatchExecutor for ThreadedBatchExecutor {
    fn execute(
        &self,
        use_case: Arc<LocateAndAlignUseCase>,
        jobs: Vec<BatchJob>,
        logger: &mut dyn PipelineLogger,
    ) -> Vec<BatchOutcome> {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }
        let worker_count = self.workers.min(total);
        let names: Vec<String> = jobs.iter().map(|job| job.name.clone()).collect();

        let (job_tx, job_rx) = crossbeam_channel::bounded::<(usize, BatchJob)>(self.channel_capacity);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<Completed>(self.channel_capacity);

        let feeder = spawn_feeder(jobs, job_tx);
        let workers: Vec<_> = (0..worker_count)
            .map(|_| spawn_worker(Arc::clone(&use_case), job_rx.clone(), done_tx.clone()))
            .collect();
        // Only workers hold senders now; the loop below ends when they all exit.
        drop(job_rx);
        drop(done_tx);

        let mut slots: Vec<Option<BatchOutcome>> = (0..total).map(|_| None).collect();
        let mut finished = 0;
        for (slot, outcome, duration_ms) in done_rx {
            record_outcome(logger, &outcome, duration_ms);
            slots[slot] = Some(outcome);
            finished += 1;
            logger.progress(finished, total);
        }

        if feeder.join().is_err() {
            logger.info("Feeder thread panicked");
        }
        for handle in workers {
            if handle.join().is_err() {
                logger.info("Worker thread panicked");
            }
        }

        collect_slots(slots, names)
    }
}

/// Pairs each slot with its job name; empty slots become interrupted outcomes.
fn collect_slots(slots: Vec<Option<BatchOutcome>>, names: Vec<String>) -> Vec<BatchOutcome> {
    slots
        .into_iter()
        .zip(names)
        .map(|(slot, name)| {
            slot.unwrap_or_else(|| {
                log::warn!("No outcome for {name}");
                BatchOutcome {
                    name,
                    result: Err(MatchError::Interrupted),
                }
            })
        })
        .collect()
}

fn spawn_feeder(jobs: Vec<BatchJob>, job_tx: Sender<(usize, BatchJob)>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for pair in jobs.into_iter().enumerate() {
            if job_tx.send(pair).is_err() {
                break;
            }
        }
    })
}

fn spawn_worker(
    use_case: Arc<LocateAndAlignUseCase>,
    job_rx: Receiver<(usize, BatchJob)>,
    done_tx: Sender<Completed>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (slot, job) in job_rx {
            let started = Instant::now();
            let result = use_case.execute(&job.transcript, job.target);
            let outcome = BatchOutcome {
                name: job.name,
                result,
            };
            let elapsed = started.elapsed().as_secs_f64() * 1000.0;
            if done_tx.send((slot, outcome, elapsed)).is_err() {
                break;
            }
        }
    })
}
