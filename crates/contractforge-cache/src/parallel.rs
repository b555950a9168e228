//! Bounded parallel execution of independent validation tasks
//!
//! Tasks run in waves of at most the configured concurrency; each wave
//! completes before the next starts and result order matches input order.

use std::future::Future;

use futures::future::join_all;
use tracing::debug;

use crate::error::{CacheError, Result};

/// Runs batches of independent futures with bounded concurrency
#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    max_concurrency: usize,
}

impl ParallelExecutor {
    /// Creates an executor, rejecting a zero concurrency bound
    pub fn new(max_concurrency: usize) -> Result<Self> {
        if max_concurrency == 0 {
            return Err(CacheError::InvalidConfig(
                "max_concurrency must be positive".to_string(),
            ));
        }
        Ok(Self { max_concurrency })
    }

    /// The configured concurrency bound
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Executes all tasks, at most `max_concurrency` at a time
    pub async fn run_bounded<F, T>(&self, tasks: Vec<F>) -> Vec<T>
    where
        F: Future<Output = T>,
    {
        let total = tasks.len();
        let mut results = Vec::with_capacity(total);
        let mut remaining = tasks.into_iter();

        loop {
            let wave: Vec<F> = remaining.by_ref().take(self.max_concurrency).collect();
            if wave.is_empty() {
                break;
            }
            results.extend(join_all(wave).await);
        }

        debug!(total, waves = total.div_ceil(self.max_concurrency), "bounded parallel run complete");
        results
    }
}

impl Default for ParallelExecutor {
    fn default() -> Self {
        Self { max_concurrency: 4 }
    }
}
