//! Rolling-window pipeline metrics

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use parking_lot::RwLock;

use contractforge_cache::CacheStats;

use crate::types::GenerationEvent;

/// Fixed-capacity window over the most recent generation events
#[derive(Debug)]
pub struct RollingWindow {
    events: VecDeque<GenerationEvent>,
    capacity: usize,
}

impl RollingWindow {
    /// Creates a window holding at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an event, dropping the oldest when full
    pub fn push(&mut self, event: GenerationEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Number of events currently in the window
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the window holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Average request duration in the window
    pub fn avg_duration_ms(&self) -> f64 {
        self.average(|e| e.duration_ms)
    }

    /// Average quality score in the window
    pub fn avg_quality(&self) -> f64 {
        self.average(|e| e.quality)
    }

    /// Fraction of failed requests in the window
    pub fn error_rate(&self) -> f64 {
        self.average(|e| if e.success { 0.0 } else { 1.0 })
    }

    /// Fraction of fallback results in the window
    pub fn fallback_rate(&self) -> f64 {
        self.average(|e| if e.fallback_used { 1.0 } else { 0.0 })
    }

    fn average(&self, value: impl Fn(&GenerationEvent) -> f64) -> f64 {
        if self.events.is_empty() {
            return 0.0;
        }
        self.events.iter().map(value).sum::<f64>() / self.events.len() as f64
    }
}

/// Concurrency-safe holder for all pipeline metric state
#[derive(Debug)]
pub struct PipelineMetrics {
    window: RwLock<RollingWindow>,
    in_flight: AtomicUsize,
    cache_stats: RwLock<CacheStats>,
}

impl PipelineMetrics {
    /// Creates metrics with the given window capacity
    pub fn new(window_size: usize) -> Self {
        Self {
            window: RwLock::new(RollingWindow::new(window_size)),
            in_flight: AtomicUsize::new(0),
            cache_stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Records one finished generation
    pub fn record(
        &self,
        quality: f64,
        success: bool,
        duration_ms: f64,
        correction_attempts: u32,
        fallback_used: bool,
    ) {
        self.window.write().push(GenerationEvent {
            quality,
            success,
            duration_ms,
            correction_attempts,
            fallback_used,
            timestamp: Utc::now(),
        });
    }

    /// Replaces the cache statistics snapshot
    pub fn update_cache_stats(&self, stats: CacheStats) {
        *self.cache_stats.write() = stats;
    }

    /// Latest cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache_stats.read().clone()
    }

    /// Marks one request as started
    pub fn request_started(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Marks one request as finished
    pub fn request_finished(&self) {
        let previous = self.in_flight.fetch_sub(1, Ordering::Relaxed);
        debug_assert!(previous > 0, "request_finished without request_started");
    }

    /// Requests currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Reads the rolling window under the lock
    pub fn with_window<T>(&self, read: impl FnOnce(&RollingWindow) -> T) -> T {
        read(&self.window.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(success: bool, duration_ms: f64, fallback_used: bool) -> GenerationEvent {
        GenerationEvent {
            quality: 80.0,
            success,
            duration_ms,
            correction_attempts: 0,
            fallback_used,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_window_caps_length() {
        let mut window = RollingWindow::new(3);
        for i in 0..5 {
            window.push(event(true, i as f64, false));
        }
        assert_eq!(window.len(), 3);
        // Oldest events were dropped.
        assert_eq!(window.avg_duration_ms(), 3.0);
    }

    #[test]
    fn test_rates() {
        let mut window = RollingWindow::new(10);
        window.push(event(true, 100.0, false));
        window.push(event(false, 200.0, true));
        window.push(event(true, 300.0, true));
        assert!((window.error_rate() - 1.0 / 3.0).abs() < 1e-9);
        assert!((window.fallback_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(window.avg_duration_ms(), 200.0);
    }

    #[test]
    fn test_empty_window_rates_are_zero() {
        let window = RollingWindow::new(10);
        assert_eq!(window.error_rate(), 0.0);
        assert_eq!(window.avg_duration_ms(), 0.0);
    }

    #[test]
    fn test_in_flight_counter() {
        let metrics = PipelineMetrics::new(10);
        metrics.request_started();
        metrics.request_started();
        assert_eq!(metrics.in_flight(), 2);
        metrics.request_finished();
        assert_eq!(metrics.in_flight(), 1);
    }
}
