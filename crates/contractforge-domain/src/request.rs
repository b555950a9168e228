//! Generation requests and pipeline configuration

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::score::ScoreWeights;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("identifier pattern"));

/// One caller request to generate a quality-assured contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Natural-language description of the desired contract
    pub prompt: String,
    /// Explicit contract name; derived from the prompt when absent
    pub contract_name: Option<String>,
    /// Retry budget before falling back
    pub max_retries: u32,
    /// Minimum acceptable overall score
    pub quality_threshold: f64,
    /// In strict mode a high-risk correction forces regeneration
    pub strict_mode: bool,
}

impl GenerationRequest {
    /// Creates a request with the default retry/threshold knobs
    pub fn new(prompt: impl Into<String>) -> Self {
        let defaults = PipelineConfig::default();
        Self {
            prompt: prompt.into(),
            contract_name: None,
            max_retries: defaults.max_retries,
            quality_threshold: defaults.quality_threshold,
            strict_mode: false,
        }
    }

    /// The contract identifier to use in templates and prompts
    ///
    /// Uses the explicit name when given, otherwise derives a PascalCase
    /// identifier from the first words of the prompt.
    pub fn contract_identifier(&self) -> String {
        let raw = self
            .contract_name
            .clone()
            .unwrap_or_else(|| self.prompt.split_whitespace().take(3).collect::<Vec<_>>().join(" "));
        let mut identifier = String::new();
        for word in raw.split_whitespace() {
            let cleaned = IDENTIFIER.replace_all(word, "");
            let mut chars = cleaned.chars();
            if let Some(first) = chars.next() {
                identifier.push(first.to_ascii_uppercase());
                identifier.extend(chars);
            }
        }
        // Identifiers cannot start with a digit.
        if identifier.chars().next().map_or(true, |c| c.is_ascii_digit()) {
            identifier.insert_str(0, "Contract");
        }
        identifier
    }
}

/// Tuning knobs for the whole pipeline
///
/// All thresholds are operational constants; nothing in the pipeline reads
/// a literal where one of these fields exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum acceptable overall quality score
    pub quality_threshold: f64,
    /// Retry budget before falling back
    pub max_retries: u32,
    /// Budget for one backend call in milliseconds
    pub backend_timeout_ms: u64,
    /// Corrector confidence below which regeneration is preferred
    pub confidence_floor: f64,
    /// Weights for the quality scorer
    pub score_weights: ScoreWeights,
}

impl PipelineConfig {
    /// Validates all fields, rejecting out-of-range values
    pub fn validate(&self) -> DomainResult<()> {
        if !(0.0..=100.0).contains(&self.quality_threshold) {
            return Err(DomainError::InvalidConfig {
                field: "quality_threshold".to_string(),
                reason: format!("must be within [0, 100], got {}", self.quality_threshold),
            });
        }
        if !(0.0..=100.0).contains(&self.confidence_floor) {
            return Err(DomainError::InvalidConfig {
                field: "confidence_floor".to_string(),
                reason: format!("must be within [0, 100], got {}", self.confidence_floor),
            });
        }
        if self.backend_timeout_ms == 0 {
            return Err(DomainError::InvalidConfig {
                field: "backend_timeout_ms".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        self.score_weights.validate()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 80.0,
            max_retries: 3,
            backend_timeout_ms: 30_000,
            confidence_floor: 70.0,
            score_weights: ScoreWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config = PipelineConfig {
            quality_threshold: 140.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = PipelineConfig {
            backend_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_contract_identifier_from_name() {
        let mut request = GenerationRequest::new("whatever");
        request.contract_name = Some("my token!".to_string());
        assert_eq!(request.contract_identifier(), "MyToken");
    }

    #[test]
    fn test_contract_identifier_from_prompt() {
        let request = GenerationRequest::new("simple voting system for members");
        assert_eq!(request.contract_identifier(), "SimpleVotingSystem");
    }

    #[test]
    fn test_contract_identifier_never_starts_with_digit() {
        let request = GenerationRequest::new("721 drop");
        let identifier = request.contract_identifier();
        assert!(identifier.starts_with("Contract"));
    }
}
