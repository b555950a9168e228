//! Core types for pipeline monitoring

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use contractforge_domain::IssueSeverity;

use crate::error::MonitoringError;

/// Severity scale for alerts
///
/// This is the alerting scale; validation issues use
/// [`IssueSeverity`]. The one mapping between the two scales lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    /// Informational
    Low,
    /// Needs attention soon
    Medium,
    /// Needs attention now
    High,
    /// Service health is at risk
    Critical,
}

impl AlertSeverity {
    /// The next tier up, saturating at `Critical`
    pub fn escalate(self) -> Self {
        match self {
            AlertSeverity::Low => AlertSeverity::Medium,
            AlertSeverity::Medium => AlertSeverity::High,
            AlertSeverity::High | AlertSeverity::Critical => AlertSeverity::Critical,
        }
    }
}

impl From<IssueSeverity> for AlertSeverity {
    fn from(severity: IssueSeverity) -> Self {
        match severity {
            IssueSeverity::Critical => AlertSeverity::High,
            IssueSeverity::Warning => AlertSeverity::Medium,
            IssueSeverity::Suggestion => AlertSeverity::Low,
        }
    }
}

/// What an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Latency or throughput degradation
    Performance,
    /// Memory pressure
    Memory,
    /// Cache effectiveness degradation
    Cache,
    /// Elevated failure rate
    Error,
}

/// A raised performance alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceAlert {
    /// Unique alert id
    pub id: Uuid,
    /// What the alert is about
    pub kind: AlertKind,
    /// How urgent it is
    pub severity: AlertSeverity,
    /// Human-readable description
    pub message: String,
    /// When the alert was raised
    pub timestamp: DateTime<Utc>,
    /// The configured threshold that was crossed
    pub threshold: f64,
    /// The observed value
    pub actual: f64,
}

/// Component or system health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Operating normally
    Healthy,
    /// Operating with reduced capability
    Degraded,
    /// Not operating
    Unhealthy,
}

/// How much a component matters to overall health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criticality {
    /// Nice to have
    Low,
    /// Degrades service when down
    Medium,
    /// Major feature loss when down
    High,
    /// Service cannot run without it
    Critical,
}

/// Health of one pipeline component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub component: String,
    /// Current status
    pub status: HealthStatus,
    /// How much this component matters
    pub criticality: Criticality,
    /// Components this one depends on
    pub dependencies: Vec<String>,
}

/// One generation request observed by the monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationEvent {
    /// Final overall quality score
    pub quality: f64,
    /// Whether the request succeeded without fallback or failure
    pub success: bool,
    /// Wall-clock duration in milliseconds
    pub duration_ms: f64,
    /// How many correction passes ran
    pub correction_attempts: u32,
    /// Whether the fallback produced the artifact
    pub fallback_used: bool,
    /// When the request finished
    pub timestamp: DateTime<Utc>,
}

/// Thresholds that raise alerts when crossed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Rolling average validation duration budget
    pub max_avg_duration_ms: f64,
    /// Minimum acceptable cache hit rate, percent
    pub min_cache_hit_rate: f64,
    /// Estimated cache memory budget
    pub max_memory_bytes: u64,
    /// Maximum acceptable failure fraction in the window
    pub max_error_rate: f64,
    /// Maximum concurrent in-flight requests
    pub max_in_flight: usize,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_avg_duration_ms: 5_000.0,
            min_cache_hit_rate: 40.0,
            max_memory_bytes: 64 * 1024 * 1024,
            max_error_rate: 0.25,
            max_in_flight: 32,
        }
    }
}

/// Monitor tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// How many recent generations the rolling windows hold
    pub window_size: usize,
    /// Alert thresholds
    pub thresholds: AlertThresholds,
    /// Minimum gap between repeated alerts of the same kind
    pub suppression_window: Duration,
    /// Overage multiple at which severity escalates one tier
    pub escalation_multiplier: f64,
    /// How often health checks poll the components
    pub health_poll_interval: Duration,
    /// How often thresholds are re-evaluated without traffic
    pub trend_interval: Duration,
}

impl MonitorConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<(), MonitoringError> {
        if self.window_size == 0 {
            return Err(MonitoringError::InvalidConfig(
                "window_size must be positive".to_string(),
            ));
        }
        if self.escalation_multiplier < 1.0 {
            return Err(MonitoringError::InvalidConfig(
                "escalation_multiplier must be at least 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.thresholds.max_error_rate) {
            return Err(MonitoringError::InvalidConfig(
                "max_error_rate must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            thresholds: AlertThresholds::default(),
            suppression_window: Duration::from_secs(60),
            escalation_multiplier: 2.0,
            health_poll_interval: Duration::from_secs(30),
            trend_interval: Duration::from_secs(30),
        }
    }
}

/// Read-only snapshot of everything the dashboard shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Overall rolled-up health
    pub status: HealthStatus,
    /// Rolling average request duration
    pub avg_duration_ms: f64,
    /// Failure fraction in the window
    pub error_rate: f64,
    /// Fallback fraction in the window
    pub fallback_rate: f64,
    /// Rolling average quality score
    pub avg_quality: f64,
    /// Requests currently in flight
    pub in_flight: usize,
    /// Latest cache statistics
    pub cache: contractforge_cache::CacheStats,
    /// Alerts raised in the last hour
    pub recent_alerts: Vec<PerformanceAlert>,
    /// Per-component health from the latest poll
    pub components: Vec<ComponentHealth>,
    /// When this snapshot was taken
    pub generated_at: DateTime<Utc>,
}
