use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for batch orchestration events.
///
/// Keeps executors free of any particular output mechanism; the CLI logs
/// through `log`, tests discard everything.
pub trait PipelineLogger: Send {
    /// Report how many transcripts have finished out of `total`.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one transcript.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time value (e.g. overlap score, word count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Aggregates per-stage timings and metrics, logs throttled progress and
/// renders a summary once the batch completes.
pub struct StdoutPipelineLogger {
    throttle: usize,
    timings: BTreeMap<String, Vec<f64>>,
    metrics: BTreeMap<String, Vec<f64>>,
    start_time: Instant,
    total_jobs: usize,
    completed: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    /// Progress is logged every `throttle` transcripts and on the last one.
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            total_jobs: 0,
            completed: 0,
            messages: Vec::new(),
        }
    }

    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Batch summary ({}/{} transcripts, {elapsed_s:.2}s total):",
            self.completed, self.total_jobs
        )];

        for (stage, durations) in &self.timings {
            let total_ms: f64 = durations.iter().sum();
            lines.push(format!(
                "  {stage:12}: avg {:6.2}ms  max {:6.2}ms  total {total_ms:7.1}ms",
                mean(durations),
                durations.iter().copied().fold(0.0, f64::max),
            ));
        }

        for (name, values) in &self.metrics {
            lines.push(format!("  {name}: avg {:.2}", mean(values)));
        }

        if self.completed > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} transcripts/s",
                self.completed as f64 / elapsed_s
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.completed = current;
        self.total_jobs = total;
        if total > 0 && (current % self.throttle == 0 || current == total) {
            log::info!("Matched {current}/{total} transcripts");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 4);
        logger.timing("match", 1.5);
        logger.metric("score", 0.8);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timings_grouped_by_stage() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("match", 2.0);
        logger.timing("match", 4.0);
        logger.timing("export", 1.0);

        assert_eq!(logger.timings_for("match").unwrap(), &[2.0, 4.0]);
        assert_eq!(logger.timings_for("export").unwrap(), &[1.0]);
        assert!(logger.timings_for("locate").is_none());
    }

    #[test]
    fn test_metric_average_in_summary() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(2, 2);
        logger.metric("accuracy", 0.5);
        logger.metric("accuracy", 1.0);

        assert_relative_eq!(mean(logger.metrics_for("accuracy").unwrap()), 0.75);
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("accuracy: avg 0.75"));
        assert!(summary.contains("2/2 transcripts"));
    }

    #[test]
    fn test_summary_lists_stage_and_throughput() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(3, 3);
        logger.timing("match", 3.0);
        std::thread::sleep(std::time::Duration::from_millis(2));

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Batch summary"));
        assert!(summary.contains("match"));
        assert!(summary.contains("transcripts/s"));
    }

    #[test]
    fn test_empty_summary_is_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_totals() {
        let mut logger = StdoutPipelineLogger::new(3);
        for i in 1..=7 {
            logger.progress(i, 7);
        }
        assert_eq!(logger.completed, 7);
        assert_eq!(logger.total_jobs, 7);
    }

    #[test]
    fn test_info_keeps_messages() {
        let mut logger = StdoutPipelineLogger::default();
        logger.info("loaded 3 transcripts");
        assert_eq!(logger.messages(), ["loaded 3 transcripts".to_string()]);
        assert_eq!(logger.throttle, 10);
    }

    #[test]
    fn test_zero_throttle_clamped() {
        assert_eq!(StdoutPipelineLogger::new(0).throttle, 1);
    }
}
