#![warn(missing_docs)]

//! Core domain model for ContractForge
//!
//! Shared types for the quality-assured contract generation pipeline:
//! validation issues, correction records, quality scores, generation
//! metrics, contract categories, and the Solidity type/default model.
//! Pure data with validation logic; no async, no I/O.

pub mod category;
pub mod correction;
pub mod errors;
pub mod issue;
pub mod metrics;
pub mod request;
pub mod result;
pub mod score;
pub mod soltype;

pub use category::ContractCategory;
pub use correction::{CorrectionAttempt, CorrectionRecord, CorrectionRisk};
pub use errors::{DomainError, DomainResult};
pub use issue::{IssueKind, IssueLocation, IssueSeverity, ValidationIssue, ValidationReport};
pub use metrics::GenerationMetrics;
pub use request::{GenerationRequest, PipelineConfig};
pub use result::QualityAssuredResult;
pub use score::{QualityScore, ScoreWeights};
pub use soltype::SolType;
