#![warn(missing_docs)]

//! Quality-assured contract generation for ContractForge
//!
//! Validates, repairs, scores, and, when necessary, replaces
//! machine-generated contract source so callers never receive output with
//! unresolved placeholders, truncated statements, or broken syntax. The
//! [`GenerationController`] sequences the pipeline; the detector,
//! corrector, scorer, and fallback generator are independently usable.

pub mod backend;
pub mod controller;
pub mod corrector;
pub mod detector;
pub mod error;
pub mod fallback;
pub mod health;
pub mod masking;
pub mod prompt;
pub mod scoring;
mod templates;

pub use backend::GenerationBackend;
pub use controller::{GenerationController, GenerationState, ProgressEvent};
pub use corrector::{
    AutoCorrector, CorrectionOutcome, CorrectionValidation, CorrectorConfig,
};
pub use detector::DefectDetector;
pub use error::GenerationError;
pub use fallback::FallbackGenerator;
pub use health::{
    register_pipeline_health, CorrectorHealthCheck, DetectorHealthCheck, FallbackHealthCheck,
    ScorerHealthCheck,
};
pub use masking::{mask, MaskedSource};
pub use prompt::{ContractPrompt, PromptBuilder};
pub use scoring::{QualityScorer, ScoringOptions};
