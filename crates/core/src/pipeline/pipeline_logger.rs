use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for chunk-pipeline orchestration events.
///
/// Use cases report through this instead of printing, so the CLI, tests and
/// any embedding application can each decide what to surface.
pub trait PipelineLogger: Send {
    /// A chunk finished; `current` counts completed chunks.
    fn progress(&mut self, current: usize, total: usize);

    /// How long one stage took on one chunk.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A per-chunk measurement such as `detected_pitch_hz`.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards every event.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running aggregate of one stage or metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageStats {
    pub count: usize,
    pub total: f64,
    pub min: f64,
    pub max: f64,
}

impl StageStats {
    fn new(value: f64) -> Self {
        Self {
            count: 1,
            total: value,
            min: value,
            max: value,
        }
    }

    fn record(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

fn record(map: &mut BTreeMap<String, StageStats>, key: &str, value: f64) {
    match map.get_mut(key) {
        Some(stats) => stats.record(value),
        None => {
            map.insert(key.to_string(), StageStats::new(value));
        }
    }
}

/// CLI logger: throttled progress lines through `log::info!`, plus per-stage
/// timing and metric aggregates reported at the end of the run.
pub struct StdoutPipelineLogger {
    throttle_chunks: usize,
    timings: BTreeMap<String, StageStats>,
    metrics: BTreeMap<String, StageStats>,
    start_time: Instant,
    total_chunks: usize,
    completed_chunks: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_chunks: usize) -> Self {
        Self {
            throttle_chunks: throttle_chunks.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            total_chunks: 0,
            completed_chunks: 0,
        }
    }

    pub fn timing_stats(&self, stage: &str) -> Option<StageStats> {
        self.timings.get(stage).copied()
    }

    pub fn metric_stats(&self, name: &str) -> Option<StageStats> {
        self.metrics.get(name).copied()
    }

    /// Formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let chunks = self.total_chunks;
        let mut lines = vec![format!(
            "Pipeline summary ({chunks} chunks, {elapsed_s:.1} s total):"
        )];

        for (stage, stats) in &self.timings {
            lines.push(format!(
                "  {stage:8}: avg {:6.2}ms  max {:7.2}ms  total {:8.1}ms",
                stats.mean(),
                stats.max,
                stats.total
            ));
        }
        for (name, stats) in &self.metrics {
            lines.push(format!(
                "  {name}: avg {:.2}  min {:.2}  max {:.2}  ({} samples)",
                stats.mean(),
                stats.min,
                stats.max,
                stats.count
            ));
        }

        if chunks > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} chunks/s",
                chunks as f64 / elapsed_s
            ));
        }
        Some(lines.join("\n"))
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.total_chunks = total;
        self.completed_chunks = current;
        if total > 0 && (current % self.throttle_chunks == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Transforming: {current}/{total} chunks ({pct:.0}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        record(&mut self.timings, stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        record(&mut self.metrics, name, value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.timing("pitch", 5.0);
        logger.metric("detected_pitch_hz", 220.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timings_aggregate_per_stage() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("pitch", 20.0);
        logger.timing("pitch", 30.0);
        logger.timing("filter", 5.0);

        let pitch = logger.timing_stats("pitch").unwrap();
        assert_eq!(pitch.count, 2);
        assert_relative_eq!(pitch.mean(), 25.0);
        assert_relative_eq!(pitch.min, 20.0);
        assert_relative_eq!(pitch.max, 30.0);
        assert_eq!(logger.timing_stats("filter").unwrap().count, 1);
        assert!(logger.timing_stats("tempo").is_none());
    }

    #[test]
    fn test_metrics_aggregate() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.metric("chunk_len_ratio", 0.9);
        logger.metric("chunk_len_ratio", 1.1);
        let stats = logger.metric_stats("chunk_len_ratio").unwrap();
        assert_relative_eq!(stats.mean(), 1.0);
    }

    #[test]
    fn test_summary_lists_stages_metrics_and_throughput() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(20, 20);
        logger.timing("tempo", 4.0);
        logger.timing("mix", 1.0);
        logger.metric("detected_pitch_hz", 440.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Pipeline summary (20 chunks"));
        assert!(summary.contains("tempo"));
        assert!(summary.contains("mix"));
        assert!(summary.contains("detected_pitch_hz: avg 440.00"));
        assert!(summary.contains("chunks/s"));
        assert!(summary.find("mix").unwrap() < summary.find("tempo").unwrap());
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_counts() {
        let mut logger = StdoutPipelineLogger::new(4);
        for i in 1..=7 {
            logger.progress(i, 7);
        }
        assert_eq!(logger.total_chunks, 7);
        assert_eq!(logger.completed_chunks, 7);
    }

    #[test]
    fn test_throttle_is_at_least_one() {
        assert_eq!(StdoutPipelineLogger::new(0).throttle_chunks, 1);
        assert_eq!(StdoutPipelineLogger::default().throttle_chunks, 10);
    }
}
