//! In-Memory Result Cache
//!
//! TTL cache for function invocation results, keyed by function name
//! plus the canonical JSON of the positional arguments. DashMap keeps
//! access concurrent without a global lock.

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::models::types::Grid;
use crate::utils::constants::DEFAULT_CACHE_TTL_SECS;

/// Cache entry with timestamp for TTL validation
#[derive(Clone, Debug)]
pub struct CacheEntry {
    grid: Grid,
    created_at: Instant,
    ttl_secs: u64,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > Duration::from_secs(self.ttl_secs)
    }

    fn remaining_ttl(&self) -> u64 {
        let elapsed = self.created_at.elapsed().as_secs();
        self.ttl_secs.saturating_sub(elapsed)
    }
}

/// Shared grid cache backed by DashMap
#[derive(Clone)]
pub struct GridCache {
    store: Arc<DashMap<String, CacheEntry>>,
    ttl_secs: u64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for GridCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GridCache {
    /// Cache with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL_SECS)
    }

    /// Cache with a custom TTL
    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl_secs,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Canonical cache key for an invocation
    pub fn key(function: &str, params: &[Value]) -> String {
        format!(
            "{}:{}",
            function,
            serde_json::to_string(params).unwrap_or_default()
        )
    }

    /// Get with TTL validation; expired entries are dropped on access
    pub fn get(&self, key: &str) -> Option<Grid> {
        if let Some(entry) = self.store.get(key) {
            if entry.is_expired() {
                drop(entry); // release the read lock before removing
                self.store.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS (expired): {}", key);
                None
            } else {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let remaining = entry.remaining_ttl();
                info!("✅ CACHE HIT: {} (TTL: {}s remaining)", key, remaining);
                Some(entry.grid.clone())
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS: {}", key);
            None
        }
    }

    /// Store a grid under the given key
    pub fn set(&self, key: String, grid: Grid) {
        let entry = CacheEntry {
            grid,
            created_at: Instant::now(),
            ttl_secs: self.ttl_secs,
        };
        info!("💾 CACHE SET: {} (TTL: {}s)", key, self.ttl_secs);
        self.store.insert(key, entry);
    }

    /// Drop every expired entry; returns how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired());
        before - self.store.len()
    }

    /// Cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_grid() -> Grid {
        let mut grid = Grid::with_header(&["date".to_string()]);
        grid.push_row(vec![json!("2019-09-03")]);
        grid
    }

    #[test]
    fn test_cache_set_get() {
        let cache = GridCache::new();
        let key = GridCache::key("quandl-series", &[json!("NASDAQOMX/XNDXT25")]);

        cache.set(key.clone(), sample_grid());
        let result = cache.get(&key);
        assert!(result.is_some());
        assert_eq!(result.unwrap().row_count(), 1);
    }

    #[test]
    fn test_cache_miss() {
        let cache = GridCache::new();
        assert!(cache.get("quandl-series:[]").is_none());
    }

    #[test]
    fn test_key_distinguishes_args() {
        let a = GridCache::key("quandl-series", &[json!("HKEX/83079")]);
        let b = GridCache::key("quandl-series", &[json!("HKEX/83079"), json!("*")]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = GridCache::with_ttl(0);
        let key = "quandl-list:[\"HKEX/83079\"]".to_string();
        cache.set(key.clone(), sample_grid());

        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_cache_stats() {
        let cache = GridCache::new();
        let key = GridCache::key("quandl-list", &[json!("HKEX/83079")]);

        cache.set(key.clone(), sample_grid());
        cache.get(&key); // HIT
        cache.get("quandl-list:missing"); // MISS

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
