#![warn(missing_docs)]

//! Validation caching and performance optimization for ContractForge
//!
//! Provides the class-partitioned result cache with TTL expiry, LFU/LRU
//! eviction, emergency cleanup, and a background sweeper, plus the bounded
//! parallel executor used to run independent validation checks.

pub mod cache;
pub mod error;
pub mod metrics;
pub mod parallel;

pub use cache::{CacheClass, CacheConfig, CacheEntry, ValidationCache};
pub use error::{CacheError, Result};
pub use metrics::{CacheMetrics, CacheStats};
pub use parallel::ParallelExecutor;
