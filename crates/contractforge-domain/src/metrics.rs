//! Per-request generation metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timing and defect counters accumulated across all attempts of one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetrics {
    /// How many backend attempts were made
    pub attempt_count: u32,
    /// Wall-clock time of the whole request in milliseconds
    pub total_generation_time_ms: u64,
    /// Time spent in the detector in milliseconds
    pub validation_time_ms: u64,
    /// Time spent in the corrector in milliseconds
    pub correction_time_ms: u64,
    /// Overall score of the returned artifact
    pub final_quality_score: f64,
    /// Total issues found across all attempts
    pub issues_detected: usize,
    /// Total issues repaired across all attempts
    pub issues_fixed: usize,
    /// When the request started
    pub started_at: DateTime<Utc>,
    /// When the request finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl GenerationMetrics {
    /// Starts a fresh metrics record for a new request
    pub fn start() -> Self {
        Self {
            attempt_count: 0,
            total_generation_time_ms: 0,
            validation_time_ms: 0,
            correction_time_ms: 0,
            final_quality_score: 0.0,
            issues_detected: 0,
            issues_fixed: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Records repaired issues, capped so `issues_fixed <= issues_detected`
    pub fn record_fixes(&mut self, fixed: usize) {
        self.issues_fixed = (self.issues_fixed + fixed).min(self.issues_detected);
    }

    /// Closes the record, stamping the finish time
    pub fn finish(&mut self, final_quality_score: f64) {
        let finished = Utc::now();
        self.final_quality_score = final_quality_score;
        self.total_generation_time_ms = (finished - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
        self.finished_at = Some(finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixes_never_exceed_detected() {
        let mut metrics = GenerationMetrics::start();
        metrics.issues_detected = 3;
        metrics.record_fixes(10);
        assert_eq!(metrics.issues_fixed, 3);
    }

    #[test]
    fn test_finish_stamps_times() {
        let mut metrics = GenerationMetrics::start();
        metrics.finish(85.0);
        assert!(metrics.finished_at.is_some());
        assert_eq!(metrics.final_quality_score, 85.0);
    }
}
