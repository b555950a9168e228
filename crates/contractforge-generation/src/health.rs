//! Health checks for the pipeline components
//!
//! Each component proves itself with a tiny self-test against known input.
//! The detector and fallback are critical: without defect detection the
//! quality gate is blind, and without the fallback there is no safety net.

use std::sync::Arc;

use async_trait::async_trait;

use contractforge_monitoring::{Criticality, HealthCheck, HealthStatus, PipelineMonitor};

use crate::corrector::AutoCorrector;
use crate::detector::DefectDetector;
use crate::fallback::FallbackGenerator;
use crate::scoring::QualityScorer;

const PROBE_DEFECT: &str = "contract Probe {\n    uint256 public value = undefined;\n}";

/// Self-test for the defect detector
#[derive(Debug, Default)]
pub struct DetectorHealthCheck;

#[async_trait]
impl HealthCheck for DetectorHealthCheck {
    fn name(&self) -> &str {
        "detector"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Critical
    }

    async fn check(&self) -> HealthStatus {
        let report = DefectDetector::new().scan(PROBE_DEFECT);
        if report.critical_issues == 1 {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

/// Self-test for the auto-corrector
#[derive(Debug, Default)]
pub struct CorrectorHealthCheck;

#[async_trait]
impl HealthCheck for CorrectorHealthCheck {
    fn name(&self) -> &str {
        "corrector"
    }

    fn criticality(&self) -> Criticality {
        Criticality::High
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["detector".to_string()]
    }

    async fn check(&self) -> HealthStatus {
        let outcome = AutoCorrector::new().correct(PROBE_DEFECT);
        if outcome.remaining_issue_count == 0 && !outcome.requires_regeneration {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}

/// Self-test for the quality scorer
#[derive(Debug, Default)]
pub struct ScorerHealthCheck;

#[async_trait]
impl HealthCheck for ScorerHealthCheck {
    fn name(&self) -> &str {
        "scorer"
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["detector".to_string()]
    }

    async fn check(&self) -> HealthStatus {
        let score = QualityScorer::new().score(PROBE_DEFECT);
        if (0.0..=100.0).contains(&score.overall) && !score.production_readiness {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

/// Self-test for the fallback generator
#[derive(Debug, Default)]
pub struct FallbackHealthCheck;

#[async_trait]
impl HealthCheck for FallbackHealthCheck {
    fn name(&self) -> &str {
        "fallback"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Critical
    }

    async fn check(&self) -> HealthStatus {
        match FallbackGenerator::new().generate("health probe", None) {
            Ok(code) if DefectDetector::new().scan(&code).is_clean() => HealthStatus::Healthy,
            _ => HealthStatus::Unhealthy,
        }
    }
}

/// Registers all pipeline component checks with the monitor
pub async fn register_pipeline_health(monitor: &PipelineMonitor) {
    monitor
        .register_health_check(Arc::new(DetectorHealthCheck))
        .await;
    monitor
        .register_health_check(Arc::new(CorrectorHealthCheck))
        .await;
    monitor
        .register_health_check(Arc::new(ScorerHealthCheck))
        .await;
    monitor
        .register_health_check(Arc::new(FallbackHealthCheck))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use contractforge_monitoring::HealthStatus;

    #[tokio::test]
    async fn test_all_components_healthy() {
        for check in [
            Box::new(DetectorHealthCheck) as Box<dyn HealthCheck>,
            Box::new(CorrectorHealthCheck),
            Box::new(ScorerHealthCheck),
            Box::new(FallbackHealthCheck),
        ] {
            assert_eq!(
                check.check().await,
                HealthStatus::Healthy,
                "{} unhealthy",
                check.name()
            );
        }
    }

    #[tokio::test]
    async fn test_registration_populates_monitor() {
        let monitor = PipelineMonitor::with_defaults();
        register_pipeline_health(&monitor).await;
        let components = monitor.check_health_now().await;
        assert_eq!(components.len(), 4);
        assert_eq!(monitor.status().await, HealthStatus::Healthy);
    }
}
