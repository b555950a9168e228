//! Domain-level errors

use thiserror::Error;

/// Result alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised by domain-type validation
#[derive(Debug, Error)]
pub enum DomainError {
    /// A configuration value is outside its legal range
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Name of the offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// An issue was constructed in an inconsistent state
    #[error("Invalid validation issue: {0}")]
    InvalidIssue(String),

    /// A score value is outside [0, 100]
    #[error("Score out of range: {0}")]
    ScoreOutOfRange(f64),
}
