//! The result returned to callers for every generation request

use serde::{Deserialize, Serialize};

use crate::correction::CorrectionAttempt;
use crate::issue::ValidationReport;
use crate::metrics::GenerationMetrics;
use crate::score::QualityScore;

/// The quality-assured outcome of one generation request
///
/// Always fully populated, even when generation failed outright: callers
/// get a score of zero and the recorded issues rather than an empty shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssuredResult {
    /// The final contract source
    pub code: String,
    /// Score of the final source
    pub quality_score: QualityScore,
    /// Detector reports from every attempt, in order
    pub validation_results: Vec<ValidationReport>,
    /// Correction passes from every attempt, in order
    pub correction_history: Vec<CorrectionAttempt>,
    /// Whether the deterministic fallback produced the final source
    pub fallback_used: bool,
    /// Why the fallback was taken, when it was
    pub fallback_reason: Option<String>,
    /// Timing and defect counters for the whole request
    pub metrics: GenerationMetrics,
}

impl QualityAssuredResult {
    /// Total issues detected across all attempts
    pub fn issues_detected(&self) -> usize {
        self.validation_results.iter().map(|r| r.total_issues).sum()
    }

    /// Whether the final artifact passed the production-readiness gate
    pub fn is_production_ready(&self) -> bool {
        self.quality_score.production_readiness
    }
}
