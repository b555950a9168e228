//! Class-partitioned validation cache
//!
//! Memoizes validation and scoring results per cache class with TTL expiry,
//! least-frequently/least-recently-used eviction under capacity pressure,
//! an emergency cleanup that halves every class when estimated memory
//! crosses the configured threshold, and a background sweeper that removes
//! expired entries on a fixed interval.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::error::{CacheError, Result};
use crate::metrics::{CacheMetrics, CacheStats};

/// The independent result classes the pipeline caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheClass {
    /// Bracket/structure scan results
    Syntax,
    /// Full error reports
    Error,
    /// Placeholder scan results
    Placeholder,
    /// Quality scores
    Quality,
    /// Reusable pattern matches
    Pattern,
}

impl CacheClass {
    /// All classes, in store order
    pub const ALL: [CacheClass; 5] = [
        CacheClass::Syntax,
        CacheClass::Error,
        CacheClass::Placeholder,
        CacheClass::Quality,
        CacheClass::Pattern,
    ];

    fn index(self) -> usize {
        match self {
            CacheClass::Syntax => 0,
            CacheClass::Error => 1,
            CacheClass::Placeholder => 2,
            CacheClass::Quality => 3,
            CacheClass::Pattern => 4,
        }
    }

    /// Stable lowercase name for logs
    pub fn as_str(self) -> &'static str {
        match self {
            CacheClass::Syntax => "syntax",
            CacheClass::Error => "error",
            CacheClass::Placeholder => "placeholder",
            CacheClass::Quality => "quality",
            CacheClass::Pattern => "pattern",
        }
    }
}

/// Cache tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long an entry stays valid
    pub ttl: Duration,
    /// Capacity per cache class
    pub max_entries_per_class: usize,
    /// Estimated memory above which emergency cleanup runs
    pub memory_threshold_bytes: u64,
    /// How often the background sweeper removes expired entries
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig("ttl must be positive".to_string()));
        }
        if self.max_entries_per_class == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries_per_class must be positive".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries_per_class: 512,
            memory_threshold_bytes: 16 * 1024 * 1024,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// One memoized result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The serialized payload
    pub value: serde_json::Value,
    /// When the entry was created
    pub created_at: Instant,
    /// When the entry was last read
    pub last_access: Instant,
    /// How often the entry was read
    pub access_count: u64,
    /// Rough payload size in bytes
    pub size_estimate: usize,
}

impl CacheEntry {
    fn new(value: serde_json::Value, key_len: usize) -> Self {
        let size_estimate = serde_json::to_string(&value)
            .map(|s| s.len())
            .unwrap_or(0)
            + key_len;
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            last_access: now,
            access_count: 0,
            size_estimate,
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Process-wide memoization of validation and scoring results
///
/// Shared by reference across concurrent requests; all stores are
/// concurrency-safe maps. Construct once, `start` the sweeper, and
/// `shutdown` on process exit.
pub struct ValidationCache {
    config: CacheConfig,
    stores: [DashMap<String, CacheEntry>; 5],
    metrics: CacheMetrics,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
    sweeper: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ValidationCache {
    /// Creates a cache, validating the configuration
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stores: Default::default(),
            metrics: CacheMetrics::new(),
            shutdown_tx: Mutex::new(None),
            sweeper: Mutex::new(None),
        })
    }

    /// Creates a cache with default configuration
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default()).expect("default cache config is valid")
    }

    fn store(&self, class: CacheClass) -> &DashMap<String, CacheEntry> {
        &self.stores[class.index()]
    }

    /// Returns the cached value or computes, stores, and returns it
    ///
    /// A TTL-expired entry counts as a miss and is recomputed.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        class: CacheClass,
        key: &str,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(value) = self.lookup(class, key) {
            return serde_json::from_value(value)
                .map_err(|e| CacheError::Deserialization(e.to_string()));
        }

        let computed = compute().await;
        let value = serde_json::to_value(&computed)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.insert(class, key, value);
        Ok(computed)
    }

    /// Reads a fresh entry, refreshing its access metadata
    fn lookup(&self, class: CacheClass, key: &str) -> Option<serde_json::Value> {
        let store = self.store(class);
        let expired = match store.get_mut(key) {
            Some(mut entry) => {
                if entry.is_expired(self.config.ttl) {
                    true
                } else {
                    entry.last_access = Instant::now();
                    entry.access_count += 1;
                    self.metrics.record_hit();
                    return Some(entry.value.clone());
                }
            }
            None => false,
        };
        if expired {
            store.remove(key);
            self.metrics.record_expirations(1);
        }
        self.metrics.record_miss();
        None
    }

    /// Stores a value, evicting under capacity pressure
    pub fn insert(&self, class: CacheClass, key: &str, value: serde_json::Value) {
        let store = self.store(class);
        if !store.contains_key(key) && store.len() >= self.config.max_entries_per_class {
            self.evict_one(class);
        }
        store.insert(key.to_string(), CacheEntry::new(value, key.len()));

        if self.estimated_bytes() > self.config.memory_threshold_bytes {
            self.emergency_cleanup();
        }
    }

    /// Removes the least-accessed entry, tie-broken by oldest access
    fn evict_one(&self, class: CacheClass) {
        let store = self.store(class);
        let victim = store
            .iter()
            .min_by(|a, b| {
                a.access_count
                    .cmp(&b.access_count)
                    .then(a.last_access.cmp(&b.last_access))
            })
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            store.remove(&key);
            self.metrics.record_evictions(1);
            debug!(class = class.as_str(), key, "evicted cache entry");
        }
    }

    /// Halves every class, keeping the most-accessed, most-recent entries
    pub fn emergency_cleanup(&self) {
        let mut removed = 0u64;
        for class in CacheClass::ALL {
            let store = self.store(class);
            let mut entries: Vec<(String, u64, Instant)> = store
                .iter()
                .map(|e| (e.key().clone(), e.access_count, e.last_access))
                .collect();
            entries.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));
            let keep = entries.len().div_ceil(2);
            for (key, _, _) in entries.into_iter().skip(keep) {
                store.remove(&key);
                removed += 1;
            }
        }
        self.metrics.record_evictions(removed);
        warn!(removed, "emergency cache cleanup");
    }

    /// Removes every TTL-expired entry
    pub fn sweep(&self) {
        let mut removed = 0u64;
        for class in CacheClass::ALL {
            let store = self.store(class);
            let expired: Vec<String> = store
                .iter()
                .filter(|e| e.is_expired(self.config.ttl))
                .map(|e| e.key().clone())
                .collect();
            for key in expired {
                store.remove(&key);
                removed += 1;
            }
        }
        if removed > 0 {
            self.metrics.record_expirations(removed);
            debug!(removed, "cache sweep removed expired entries");
        }
    }

    /// Spawns the background sweeper; idempotent
    pub async fn start(self: &Arc<Self>) {
        let mut sweeper = self.sweeper.lock().await;
        if sweeper.is_some() {
            return;
        }
        let (tx, mut rx) = mpsc::channel(1);
        *self.shutdown_tx.lock().await = Some(tx);

        let cache = Arc::clone(self);
        let interval = self.config.sweep_interval;
        *sweeper = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => cache.sweep(),
                    _ = rx.recv() => {
                        info!("cache sweeper shutting down");
                        break;
                    }
                }
            }
        }));
    }

    /// Stops the background sweeper
    pub async fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(()).await;
        }
        if let Some(task) = self.sweeper.lock().await.take() {
            let _ = task.await;
        }
    }

    /// Entries currently held across all classes
    pub fn entry_count(&self) -> usize {
        self.stores.iter().map(|s| s.len()).sum()
    }

    /// Estimated bytes currently held across all classes
    pub fn estimated_bytes(&self) -> u64 {
        self.stores
            .iter()
            .map(|s| s.iter().map(|e| e.size_estimate as u64).sum::<u64>())
            .sum()
    }

    /// Snapshots hit/miss/eviction counters and sizes
    pub fn stats(&self) -> CacheStats {
        self.metrics
            .snapshot(self.entry_count(), self.estimated_bytes())
    }

    /// The active configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
