//! Threshold alerting with channels, suppression, and escalation

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{error, warn};
use uuid::Uuid;

use crate::types::{AlertKind, AlertSeverity, PerformanceAlert};

/// A delivery target for raised alerts
///
/// Channels filter on severity and kind; an alert is delivered to every
/// channel that accepts it.
pub trait AlertChannel: Send + Sync {
    /// Channel name for logs
    fn name(&self) -> &str;

    /// Minimum severity this channel wants
    fn min_severity(&self) -> AlertSeverity {
        AlertSeverity::Low
    }

    /// Whether this channel wants alerts of the given kind
    fn accepts_kind(&self, _kind: AlertKind) -> bool {
        true
    }

    /// Delivers one alert
    fn deliver(&self, alert: &PerformanceAlert);
}

/// Default channel that writes alerts to the tracing log
#[derive(Debug, Default)]
pub struct TracingAlertChannel;

impl AlertChannel for TracingAlertChannel {
    fn name(&self) -> &str {
        "tracing"
    }

    fn deliver(&self, alert: &PerformanceAlert) {
        match alert.severity {
            AlertSeverity::Critical | AlertSeverity::High => {
                error!(
                    kind = ?alert.kind,
                    severity = ?alert.severity,
                    threshold = alert.threshold,
                    actual = alert.actual,
                    "{}",
                    alert.message
                );
            }
            _ => {
                warn!(
                    kind = ?alert.kind,
                    severity = ?alert.severity,
                    threshold = alert.threshold,
                    actual = alert.actual,
                    "{}",
                    alert.message
                );
            }
        }
    }
}

/// Raises, suppresses, escalates, and fans out alerts
pub struct AlertManager {
    channels: Vec<Box<dyn AlertChannel>>,
    history: RwLock<Vec<PerformanceAlert>>,
    last_raised: RwLock<HashMap<AlertKind, Instant>>,
    suppression_window: Duration,
    escalation_multiplier: f64,
}

impl AlertManager {
    /// Creates a manager delivering to the default tracing channel
    pub fn new(suppression_window: Duration, escalation_multiplier: f64) -> Self {
        Self {
            channels: vec![Box::new(TracingAlertChannel)],
            history: RwLock::new(Vec::new()),
            last_raised: RwLock::new(HashMap::new()),
            suppression_window,
            escalation_multiplier,
        }
    }

    /// Adds a delivery channel
    pub fn add_channel(&mut self, channel: Box<dyn AlertChannel>) {
        self.channels.push(channel);
    }

    /// Raises an alert unless one of the same kind fired too recently
    ///
    /// `overage` is how many times over its threshold the metric is; at or
    /// beyond the escalation multiplier the severity moves one tier up.
    pub fn raise(
        &self,
        kind: AlertKind,
        base_severity: AlertSeverity,
        message: impl Into<String>,
        threshold: f64,
        actual: f64,
        overage: f64,
    ) -> Option<PerformanceAlert> {
        {
            let last_raised = self.last_raised.read();
            if let Some(last) = last_raised.get(&kind) {
                if last.elapsed() < self.suppression_window {
                    return None;
                }
            }
        }

        let severity = if overage >= self.escalation_multiplier {
            base_severity.escalate()
        } else {
            base_severity
        };

        let alert = PerformanceAlert {
            id: Uuid::new_v4(),
            kind,
            severity,
            message: message.into(),
            timestamp: Utc::now(),
            threshold,
            actual,
        };

        for channel in &self.channels {
            if alert.severity >= channel.min_severity() && channel.accepts_kind(kind) {
                channel.deliver(&alert);
            }
        }

        self.last_raised.write().insert(kind, Instant::now());
        self.history.write().push(alert.clone());
        Some(alert)
    }

    /// Alerts raised within the given window, newest last
    pub fn recent(&self, window: Duration) -> Vec<PerformanceAlert> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::hours(1));
        self.history
            .read()
            .iter()
            .filter(|a| a.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// Total alerts raised since startup
    pub fn total_raised(&self) -> usize {
        self.history.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingChannel {
        delivered: Arc<AtomicUsize>,
        min: AlertSeverity,
    }

    impl AlertChannel for CountingChannel {
        fn name(&self) -> &str {
            "counting"
        }

        fn min_severity(&self) -> AlertSeverity {
            self.min
        }

        fn deliver(&self, _alert: &PerformanceAlert) {
            self.delivered.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn manager() -> AlertManager {
        AlertManager::new(Duration::from_secs(60), 2.0)
    }

    #[test]
    fn test_raise_records_alert() {
        let manager = manager();
        let alert = manager
            .raise(
                AlertKind::Performance,
                AlertSeverity::High,
                "validation slow",
                5_000.0,
                7_000.0,
                1.4,
            )
            .expect("raised");
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(manager.total_raised(), 1);
    }

    #[test]
    fn test_escalation_at_multiplier() {
        let manager = manager();
        let alert = manager
            .raise(
                AlertKind::Performance,
                AlertSeverity::High,
                "validation very slow",
                5_000.0,
                12_000.0,
                2.4,
            )
            .expect("raised");
        assert_eq!(alert.severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_suppression_window() {
        let manager = manager();
        assert!(manager
            .raise(AlertKind::Cache, AlertSeverity::Medium, "a", 40.0, 10.0, 1.0)
            .is_some());
        assert!(manager
            .raise(AlertKind::Cache, AlertSeverity::Medium, "b", 40.0, 10.0, 1.0)
            .is_none());
        // A different kind is not suppressed.
        assert!(manager
            .raise(AlertKind::Memory, AlertSeverity::Medium, "c", 1.0, 2.0, 1.0)
            .is_some());
        assert_eq!(manager.total_raised(), 2);
    }

    #[test]
    fn test_channel_severity_filter() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let mut manager = manager();
        manager.add_channel(Box::new(CountingChannel {
            delivered: Arc::clone(&delivered),
            min: AlertSeverity::High,
        }));

        manager.raise(AlertKind::Cache, AlertSeverity::Medium, "low", 1.0, 2.0, 1.0);
        assert_eq!(delivered.load(Ordering::SeqCst), 0);

        manager.raise(AlertKind::Error, AlertSeverity::High, "high", 1.0, 2.0, 1.0);
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recent_window() {
        let manager = manager();
        manager.raise(AlertKind::Error, AlertSeverity::High, "x", 1.0, 2.0, 1.0);
        assert_eq!(manager.recent(Duration::from_secs(3600)).len(), 1);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(manager.recent(Duration::from_secs(0)).len(), 0);
    }
}
