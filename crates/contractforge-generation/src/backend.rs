//! The upstream generation backend contract
//!
//! The pipeline treats the backend as an opaque async operation from prompt
//! to candidate code. Model identity, rate limits, and transport are the
//! implementer's concern; the controller only ever calls what is declared
//! here, wrapped in its own timeout.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::prompt::ContractPrompt;

/// An upstream service that turns prompts into candidate contract code
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Stable identifier for logs and health reports
    fn id(&self) -> &str;

    /// Generates candidate contract source for a prompt
    async fn generate_code(&self, prompt: &ContractPrompt) -> Result<String, GenerationError>;

    /// Whether the backend is currently able to serve requests
    async fn health_check(&self) -> Result<bool, GenerationError> {
        Ok(true)
    }
}
