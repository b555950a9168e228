//! Error types for the generation pipeline

use thiserror::Error;

/// Errors that can occur while producing a quality-assured contract
///
/// Everything below the controller degrades gracefully; of these variants
/// only `FallbackFailed` ever reaches the caller of
/// [`crate::controller::GenerationController::generate`].
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The upstream backend returned an error
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend did not answer within the configured budget
    #[error("Backend timed out after {elapsed_ms}ms")]
    BackendTimeout {
        /// How long the call was allowed to run
        elapsed_ms: u64,
    },

    /// A correction stage could not be applied
    #[error("Correction failed: {0}")]
    CorrectionFailed(String),

    /// The deterministic fallback could not produce an artifact
    ///
    /// This is the only terminal error: no safe artifact is obtainable.
    #[error("Fallback generation failed: {0}")]
    FallbackFailed(String),

    /// A fallback template failed to render
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration was rejected at construction
    #[error("Configuration error: {0}")]
    InvalidConfig(#[from] contractforge_domain::DomainError),

    /// The validation cache failed
    #[error("Cache error: {0}")]
    Cache(#[from] contractforge_cache::CacheError),
}
