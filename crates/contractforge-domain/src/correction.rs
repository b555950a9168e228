//! Records of automatic corrections applied to generated code

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::issue::{IssueKind, IssueLocation};

/// Risk classification for a set of corrections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionRisk {
    /// Corrections are mechanical and safe
    Low,
    /// Corrections changed structure; review recommended
    Medium,
    /// Corrections introduced a new critical issue
    High,
}

/// One value replacement or insertion performed by the corrector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// The defect kind this correction addresses
    pub kind: IssueKind,
    /// Where the correction was applied
    pub location: IssueLocation,
    /// The text that was replaced
    pub original_value: String,
    /// The text it was replaced with
    pub corrected_value: String,
    /// Why this correction was chosen
    pub reasoning: String,
    /// Confidence in this individual correction, 0-100
    pub confidence: f64,
}

impl CorrectionRecord {
    /// Creates a record, clamping confidence into [0, 100]
    pub fn new(
        kind: IssueKind,
        location: IssueLocation,
        original_value: impl Into<String>,
        corrected_value: impl Into<String>,
        reasoning: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            kind,
            location,
            original_value: original_value.into(),
            corrected_value: corrected_value.into(),
            reasoning: reasoning.into(),
            confidence: confidence.clamp(0.0, 100.0),
        }
    }
}

/// One full pass of the corrector during a generation attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionAttempt {
    /// 1-based attempt number within the request
    pub attempt_number: u32,
    /// When the attempt finished
    pub timestamp: DateTime<Utc>,
    /// Corrections applied during this attempt
    pub corrections: Vec<CorrectionRecord>,
    /// Whether the attempt removed all blocking issues
    pub success: bool,
    /// Quality score delta achieved by this attempt
    pub quality_improvement: f64,
}
