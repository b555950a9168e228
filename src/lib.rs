//! Workspace-level integration test package for ContractForge
//!
//! The crates under `crates/` carry the implementation; this package only
//! hosts the cross-crate scenario tests in `tests/`.
