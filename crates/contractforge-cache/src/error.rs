//! Error types for the validation cache

use thiserror::Error;

/// Result alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors raised by the cache layer
#[derive(Debug, Error)]
pub enum CacheError {
    /// Configuration was rejected at construction
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// A cached payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A cached payload could not be deserialized
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}
