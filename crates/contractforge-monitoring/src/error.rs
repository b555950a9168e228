//! Error types for the monitoring layer

use thiserror::Error;

/// Errors raised by the monitoring layer
#[derive(Debug, Error)]
pub enum MonitoringError {
    /// Configuration was rejected at construction
    #[error("Invalid monitoring configuration: {0}")]
    InvalidConfig(String),
}
