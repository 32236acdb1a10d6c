//! In-memory TTL cache of summary rows, keyed by symbol set.
//!
//! Expiry is lazy: an entry is only checked when it is read, and expired
//! entries are evicted whenever a rebuild takes the write lock. An expired
//! entry is rebuilt as a whole, never merged with fresh rows.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::ScreenerError;
use crate::metrics::Metrics;
use crate::models::summary::SummaryRecord;
use crate::models::symbol::SymbolSet;
use crate::snapshot::SnapshotBuilder;

/// Immutable result of one rebuild.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub built_at: DateTime<Utc>,
    built_instant: Instant,
    /// In the order of the request that triggered the rebuild.
    pub records: Vec<SummaryRecord>,
    pub ttl: Duration,
}

impl CacheEntry {
    fn new(key: String, records: Vec<SummaryRecord>, ttl: Duration) -> Self {
        Self {
            key,
            built_at: Utc::now(),
            built_instant: Instant::now(),
            records,
            ttl,
        }
    }

    pub fn age(&self) -> Duration {
        self.built_instant.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.age() >= self.ttl
    }

    /// Records rearranged to follow `symbols`. Symbols missing from the entry
    /// are skipped.
    pub fn records_in_order(&self, symbols: &SymbolSet) -> Vec<SummaryRecord> {
        symbols
            .iter()
            .filter_map(|symbol| self.records.iter().find(|r| &r.symbol == symbol).cloned())
            .collect()
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

pub struct AggregationCache {
    builder: Arc<SnapshotBuilder>,
    ttl: Duration,
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
    rebuild_lock: Mutex<()>,
    rebuilds: AtomicU64,
    metrics: Option<Arc<Metrics>>,
}

impl AggregationCache {
    pub fn new(builder: Arc<SnapshotBuilder>, ttl: Duration) -> Self {
        Self {
            builder,
            ttl,
            entries: RwLock::new(HashMap::new()),
            rebuild_lock: Mutex::new(()),
            rebuilds: AtomicU64::new(0),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn builder(&self) -> &Arc<SnapshotBuilder> {
        &self.builder
    }

    /// Live entry for `symbols`, rebuilding it first if missing or expired.
    ///
    /// Rebuilds are serialized, and the caller re-checks after waiting so a
    /// set is fetched at most once per TTL window.
    pub async fn get(&self, symbols: &SymbolSet) -> Result<Arc<CacheEntry>, ScreenerError> {
        if symbols.is_empty() {
            return Err(ScreenerError::InvalidSymbolSet);
        }
        let key = symbols.cache_key();

        if let Some(entry) = self.live_entry(&key).await {
            debug!(key = %key, age_ms = entry.age().as_millis(), "Cache hit for {}", key);
            if let Some(metrics) = &self.metrics {
                metrics.cache_hits_total.inc();
            }
            return Ok(entry);
        }

        let _rebuild = self.rebuild_lock.lock().await;
        if let Some(entry) = self.live_entry(&key).await {
            debug!(key = %key, "Cache entry for {} rebuilt by a concurrent request", key);
            return Ok(entry);
        }

        info!(
            key = %key,
            symbol_count = symbols.len(),
            "Rebuilding screener snapshot for {} symbols",
            symbols.len()
        );
        let records = self.builder.build_all(symbols).await;
        let entry = Arc::new(CacheEntry::new(key.clone(), records, self.ttl));

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired());
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted = evicted, "Evicted {} expired cache entries", evicted);
        }
        entries.insert(key, entry.clone());
        drop(entries);
        self.rebuilds.fetch_add(1, Ordering::SeqCst);
        if let Some(metrics) = &self.metrics {
            metrics.cache_rebuilds_total.inc();
        }

        Ok(entry)
    }

    /// Number of rebuilds since creation
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::SeqCst)
    }

    /// Drop the entry for `symbols`, forcing a rebuild on the next read.
    pub async fn invalidate(&self, symbols: &SymbolSet) {
        self.entries.write().await.remove(&symbols.cache_key());
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let total = entries.len();
        let expired = entries.values().filter(|e| e.is_expired()).count();
        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }

    async fn live_entry(&self, key: &str) -> Option<Arc<CacheEntry>> {
        let entries = self.entries.read().await;
        entries.get(key).filter(|e| !e.is_expired()).cloned()
    }
}
