//! Quality scores for generated contract code

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// Multi-dimensional quality score, each dimension in [0, 100]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// Weighted overall score
    pub overall: f64,
    /// Structural validity: balance, no dangling statements
    pub syntax: f64,
    /// Control-flow sanity: reachable returns, no dead branches
    pub logic: f64,
    /// Bodies non-empty, category-required elements present
    pub completeness: f64,
    /// Convention adherence: visibility qualifiers, event emission
    pub best_practices: f64,
    /// True iff overall meets the threshold and no critical issue remains
    pub production_readiness: bool,
}

impl QualityScore {
    /// Builds a score from sub-scores, computing the weighted overall and
    /// the production-readiness gate
    pub fn from_components(
        syntax: f64,
        logic: f64,
        completeness: f64,
        best_practices: f64,
        weights: &ScoreWeights,
        threshold: f64,
        critical_issues: usize,
    ) -> Self {
        let overall = (syntax * weights.syntax
            + logic * weights.logic
            + completeness * weights.completeness
            + best_practices * weights.best_practices)
            .clamp(0.0, 100.0);
        Self {
            overall,
            syntax: syntax.clamp(0.0, 100.0),
            logic: logic.clamp(0.0, 100.0),
            completeness: completeness.clamp(0.0, 100.0),
            best_practices: best_practices.clamp(0.0, 100.0),
            production_readiness: overall >= threshold && critical_issues == 0,
        }
    }

    /// The zero score used when no artifact could be produced
    pub fn zero() -> Self {
        Self {
            overall: 0.0,
            syntax: 0.0,
            logic: 0.0,
            completeness: 0.0,
            best_practices: 0.0,
            production_readiness: false,
        }
    }
}

/// Weights for rolling sub-scores into the overall score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the syntax sub-score
    pub syntax: f64,
    /// Weight of the logic sub-score
    pub logic: f64,
    /// Weight of the completeness sub-score
    pub completeness: f64,
    /// Weight of the best-practices sub-score
    pub best_practices: f64,
}

impl ScoreWeights {
    /// Validates that the weights are non-negative and sum to 1.0
    pub fn validate(&self) -> DomainResult<()> {
        let values = [
            self.syntax,
            self.logic,
            self.completeness,
            self.best_practices,
        ];
        if values.iter().any(|w| *w < 0.0) {
            return Err(DomainError::InvalidConfig {
                field: "score_weights".to_string(),
                reason: "weights must be non-negative".to_string(),
            });
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(DomainError::InvalidConfig {
                field: "score_weights".to_string(),
                reason: format!("weights must sum to 1.0, got {}", sum),
            });
        }
        Ok(())
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            syntax: 0.35,
            logic: 0.20,
            completeness: 0.25,
            best_practices: 0.20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_valid() {
        assert!(ScoreWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = ScoreWeights {
            syntax: 0.5,
            logic: 0.5,
            completeness: 0.5,
            best_practices: 0.5,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_production_readiness_gate() {
        let weights = ScoreWeights::default();

        let ready = QualityScore::from_components(100.0, 100.0, 100.0, 100.0, &weights, 80.0, 0);
        assert!(ready.production_readiness);

        let critical = QualityScore::from_components(100.0, 100.0, 100.0, 100.0, &weights, 80.0, 1);
        assert!(!critical.production_readiness);

        let low = QualityScore::from_components(50.0, 50.0, 50.0, 50.0, &weights, 80.0, 0);
        assert!(!low.production_readiness);
    }

    #[test]
    fn test_overall_in_bounds() {
        let weights = ScoreWeights::default();
        let score = QualityScore::from_components(250.0, -30.0, 80.0, 80.0, &weights, 80.0, 0);
        assert!(score.overall >= 0.0 && score.overall <= 100.0);
        assert!(score.syntax <= 100.0);
        assert!(score.logic >= 0.0);
    }
}
