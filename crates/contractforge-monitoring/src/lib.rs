#![warn(missing_docs)]

//! Performance and health monitoring for the ContractForge pipeline
//!
//! The [`PipelineMonitor`] is a process-wide service: it ingests one event
//! per finished generation, keeps rolling windows over the recent past,
//! raises threshold alerts with suppression and escalation, polls component
//! health on a timer, and exposes a read-only dashboard surface. Construct
//! it explicitly, `start` its background timers, and `shutdown` on exit.

pub mod alerting;
pub mod error;
pub mod health;
pub mod metrics;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tracing::info;

pub use alerting::{AlertChannel, AlertManager, TracingAlertChannel};
pub use error::MonitoringError;
pub use health::{rollup, HealthCheck, HealthRegistry};
pub use metrics::{PipelineMetrics, RollingWindow};
pub use types::{
    AlertKind, AlertSeverity, AlertThresholds, ComponentHealth, Criticality, DashboardSnapshot,
    GenerationEvent, HealthStatus, MonitorConfig, PerformanceAlert,
};

use contractforge_cache::CacheStats;

/// Process-wide observer of the generation pipeline
pub struct PipelineMonitor {
    config: MonitorConfig,
    metrics: PipelineMetrics,
    alerts: AlertManager,
    health: HealthRegistry,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl PipelineMonitor {
    /// Creates a monitor, validating the configuration
    pub fn new(config: MonitorConfig) -> Result<Self, MonitoringError> {
        config.validate()?;
        Ok(Self {
            metrics: PipelineMetrics::new(config.window_size),
            alerts: AlertManager::new(config.suppression_window, config.escalation_multiplier),
            health: HealthRegistry::new(),
            shutdown_tx: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
            config,
        })
    }

    /// Creates a monitor with default configuration
    pub fn with_defaults() -> Self {
        Self::new(MonitorConfig::default()).expect("default monitor config is valid")
    }

    /// Records one finished generation and re-evaluates thresholds
    pub fn record_generation(
        &self,
        quality: f64,
        success: bool,
        duration_ms: f64,
        correction_attempts: u32,
        fallback_used: bool,
    ) {
        self.metrics.record(
            quality,
            success,
            duration_ms,
            correction_attempts,
            fallback_used,
        );
        self.check_thresholds();
    }

    /// Feeds the latest cache statistics into the monitor
    pub fn update_cache_stats(&self, stats: CacheStats) {
        self.metrics.update_cache_stats(stats);
    }

    /// Marks one request as started
    pub fn request_started(&self) {
        self.metrics.request_started();
    }

    /// Marks one request as finished
    pub fn request_finished(&self) {
        self.metrics.request_finished();
    }

    /// Registers a pipeline component for health polling
    pub async fn register_health_check(&self, check: Arc<dyn HealthCheck>) {
        self.health.register(check).await;
    }

    /// Adds an alert delivery channel
    pub fn add_alert_channel(&mut self, channel: Box<dyn AlertChannel>) {
        self.alerts.add_channel(channel);
    }

    /// Evaluates every threshold and raises alerts for crossings
    pub fn check_thresholds(&self) {
        let thresholds = &self.config.thresholds;
        let (window_len, avg_duration, error_rate) = self
            .metrics
            .with_window(|w| (w.len(), w.avg_duration_ms(), w.error_rate()));

        if window_len > 0 && avg_duration > thresholds.max_avg_duration_ms {
            self.alerts.raise(
                AlertKind::Performance,
                AlertSeverity::High,
                format!("Average generation time {:.0}ms exceeds budget", avg_duration),
                thresholds.max_avg_duration_ms,
                avg_duration,
                avg_duration / thresholds.max_avg_duration_ms,
            );
        }

        if window_len > 0 && error_rate > thresholds.max_error_rate {
            self.alerts.raise(
                AlertKind::Error,
                AlertSeverity::High,
                format!("Error rate {:.0}% exceeds budget", error_rate * 100.0),
                thresholds.max_error_rate,
                error_rate,
                if thresholds.max_error_rate > 0.0 {
                    error_rate / thresholds.max_error_rate
                } else {
                    self.config.escalation_multiplier
                },
            );
        }

        let cache = self.metrics.cache_stats();
        let lookups = cache.hits + cache.misses;
        if lookups >= 20 && cache.hit_rate() < thresholds.min_cache_hit_rate {
            let actual = cache.hit_rate();
            self.alerts.raise(
                AlertKind::Cache,
                AlertSeverity::Medium,
                format!("Cache hit rate {:.0}% below budget", actual),
                thresholds.min_cache_hit_rate,
                actual,
                if actual > 0.0 {
                    thresholds.min_cache_hit_rate / actual
                } else {
                    self.config.escalation_multiplier
                },
            );
        }

        if cache.estimated_bytes > thresholds.max_memory_bytes {
            self.alerts.raise(
                AlertKind::Memory,
                AlertSeverity::High,
                format!("Cache memory {} bytes over budget", cache.estimated_bytes),
                thresholds.max_memory_bytes as f64,
                cache.estimated_bytes as f64,
                cache.estimated_bytes as f64 / thresholds.max_memory_bytes as f64,
            );
        }

        let in_flight = self.metrics.in_flight();
        if in_flight > thresholds.max_in_flight {
            self.alerts.raise(
                AlertKind::Performance,
                AlertSeverity::Medium,
                format!("{} requests in flight exceeds budget", in_flight),
                thresholds.max_in_flight as f64,
                in_flight as f64,
                in_flight as f64 / thresholds.max_in_flight as f64,
            );
        }
    }

    /// Polls every registered component now
    pub async fn check_health_now(&self) -> Vec<ComponentHealth> {
        self.health.run_all().await
    }

    /// Overall status rolled up from the latest health poll
    pub async fn status(&self) -> HealthStatus {
        let latest = self.health.latest().await;
        if latest.is_empty() {
            return rollup(&self.health.run_all().await);
        }
        rollup(&latest)
    }

    /// Alerts raised within the window, newest last
    pub fn recent_alerts(&self, window: Duration) -> Vec<PerformanceAlert> {
        self.alerts.recent(window)
    }

    /// One consistent snapshot of everything the dashboard shows
    pub async fn dashboard_snapshot(&self) -> DashboardSnapshot {
        let components = self.health.latest().await;
        let (avg_duration_ms, error_rate, fallback_rate, avg_quality) = self.metrics.with_window(
            |w| {
                (
                    w.avg_duration_ms(),
                    w.error_rate(),
                    w.fallback_rate(),
                    w.avg_quality(),
                )
            },
        );
        DashboardSnapshot {
            status: rollup(&components),
            avg_duration_ms,
            error_rate,
            fallback_rate,
            avg_quality,
            in_flight: self.metrics.in_flight(),
            cache: self.metrics.cache_stats(),
            recent_alerts: self.recent_alerts(Duration::from_secs(3600)),
            components,
            generated_at: Utc::now(),
        }
    }

    /// Serializes the dashboard snapshot for export
    pub async fn export_metrics(&self) -> serde_json::Value {
        serde_json::to_value(self.dashboard_snapshot().await)
            .unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Spawns the health-polling and trend timers; idempotent
    pub async fn start(self: &Arc<Self>) {
        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            return;
        }
        let (tx, mut health_rx) = mpsc::channel(1);
        let (trend_tx, mut trend_rx) = mpsc::channel::<()>(1);
        *self.shutdown_tx.lock().await = Some(tx);

        let monitor = Arc::clone(self);
        let poll_interval = self.config.health_poll_interval;
        tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let _ = monitor.health.run_all().await;
                    }
                    _ = health_rx.recv() => {
                        let _ = trend_tx.send(()).await;
                        info!("health poller shutting down");
                        break;
                    }
                }
            }
        }));

        let monitor = Arc::clone(self);
        let trend_interval = self.config.trend_interval;
        tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(trend_interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => monitor.check_thresholds(),
                    _ = trend_rx.recv() => {
                        info!("trend recorder shutting down");
                        break;
                    }
                }
            }
        }));
    }

    /// Stops the background timers
    pub async fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(()).await;
        }
        for task in self.tasks.lock().await.drain(..) {
            let _ = task.await;
        }
    }

    /// The active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
