//! Component health checks and rollup

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use contractforge_cache::ParallelExecutor;

use crate::types::{ComponentHealth, Criticality, HealthStatus};

/// A pollable pipeline component
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Component name
    fn name(&self) -> &str;

    /// How much this component matters to overall health
    fn criticality(&self) -> Criticality {
        Criticality::Medium
    }

    /// Names of components this one depends on
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Polls the component
    async fn check(&self) -> HealthStatus;
}

/// Registry of health checks with the latest poll results
#[derive(Default)]
pub struct HealthRegistry {
    checks: RwLock<Vec<Arc<dyn HealthCheck>>>,
    latest: RwLock<Vec<ComponentHealth>>,
    executor: ParallelExecutor,
}

impl HealthRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component for polling
    pub async fn register(&self, check: Arc<dyn HealthCheck>) {
        self.checks.write().await.push(check);
    }

    /// Polls every registered component and stores the results
    ///
    /// Checks are independent, so they run through the bounded-parallel
    /// executor rather than one by one.
    pub async fn run_all(&self) -> Vec<ComponentHealth> {
        let checks = self.checks.read().await.clone();
        let tasks: Vec<_> = checks
            .iter()
            .map(|check| {
                let check = Arc::clone(check);
                async move {
                    let status = check.check().await;
                    debug!(component = check.name(), ?status, "health check");
                    ComponentHealth {
                        component: check.name().to_string(),
                        status,
                        criticality: check.criticality(),
                        dependencies: check.dependencies(),
                    }
                }
            })
            .collect();
        let results = self.executor.run_bounded(tasks).await;
        *self.latest.write().await = results.clone();
        results
    }

    /// The most recent poll results
    pub async fn latest(&self) -> Vec<ComponentHealth> {
        self.latest.read().await.clone()
    }
}

/// Rolls component health up to one overall status
///
/// A single unhealthy critical-criticality component forces `Unhealthy`;
/// any other non-healthy component degrades the rollup.
pub fn rollup(components: &[ComponentHealth]) -> HealthStatus {
    let mut overall = HealthStatus::Healthy;
    for component in components {
        match component.status {
            HealthStatus::Unhealthy if component.criticality == Criticality::Critical => {
                return HealthStatus::Unhealthy;
            }
            HealthStatus::Unhealthy | HealthStatus::Degraded => {
                overall = HealthStatus::Degraded;
            }
            HealthStatus::Healthy => {}
        }
    }
    overall
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticCheck {
        name: String,
        status: HealthStatus,
        criticality: Criticality,
    }

    #[async_trait]
    impl HealthCheck for StaticCheck {
        fn name(&self) -> &str {
            &self.name
        }

        fn criticality(&self) -> Criticality {
            self.criticality
        }

        async fn check(&self) -> HealthStatus {
            self.status
        }
    }

    fn component(status: HealthStatus, criticality: Criticality) -> ComponentHealth {
        ComponentHealth {
            component: "c".to_string(),
            status,
            criticality,
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn test_rollup_all_healthy() {
        let components = vec![
            component(HealthStatus::Healthy, Criticality::Critical),
            component(HealthStatus::Healthy, Criticality::Low),
        ];
        assert_eq!(rollup(&components), HealthStatus::Healthy);
    }

    #[test]
    fn test_rollup_critical_unhealthy_forces_unhealthy() {
        let components = vec![
            component(HealthStatus::Healthy, Criticality::Low),
            component(HealthStatus::Unhealthy, Criticality::Critical),
        ];
        assert_eq!(rollup(&components), HealthStatus::Unhealthy);
    }

    #[test]
    fn test_rollup_noncritical_unhealthy_degrades() {
        let components = vec![
            component(HealthStatus::Unhealthy, Criticality::Low),
            component(HealthStatus::Healthy, Criticality::Critical),
        ];
        assert_eq!(rollup(&components), HealthStatus::Degraded);
    }

    #[test]
    fn test_rollup_empty_is_healthy() {
        assert_eq!(rollup(&[]), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_registry_polls_components() {
        let registry = HealthRegistry::new();
        registry
            .register(Arc::new(StaticCheck {
                name: "detector".to_string(),
                status: HealthStatus::Healthy,
                criticality: Criticality::Critical,
            }))
            .await;
        registry
            .register(Arc::new(StaticCheck {
                name: "corrector".to_string(),
                status: HealthStatus::Degraded,
                criticality: Criticality::Medium,
            }))
            .await;

        let results = registry.run_all().await;
        assert_eq!(results.len(), 2);
        assert_eq!(rollup(&results), HealthStatus::Degraded);
        assert_eq!(registry.latest().await.len(), 2);
    }
}
