//! In-memory LRU cache for source image bytes.
//!
//! Parcel overlays re-request the same index imagery while a user pans and
//! toggles layers. `ImageCache` keeps recently fetched payloads so a repeat
//! analysis skips the network. It is an explicit object handed to whoever
//! needs it (wrap it in an `Arc`), never a process-wide global.
//!
//! Eviction is memory based: when an insert would push the cache past its
//! byte budget, ~5% of the budget is freed from the least recently used end
//! in one batch. Entries also carry a TTL, checked lazily on read.

use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// The LRU itself never evicts; the byte budget does.
const LRU_CAPACITY: usize = 1_000_000;

struct CachedImage {
    data: Bytes,
    inserted_at: Instant,
    ttl: Duration,
}

impl CachedImage {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Counters for the image cache. Atomic so they can be read without the lock.
#[derive(Debug, Default)]
pub struct ImageCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub expired: AtomicU64,
    pub size_bytes: AtomicU64,
    pub entry_count: AtomicU64,
    pub eviction_runs: AtomicU64,
}

impl ImageCacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    fn snapshot(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits.load(Ordering::Relaxed)),
            misses: AtomicU64::new(self.misses.load(Ordering::Relaxed)),
            evictions: AtomicU64::new(self.evictions.load(Ordering::Relaxed)),
            expired: AtomicU64::new(self.expired.load(Ordering::Relaxed)),
            size_bytes: AtomicU64::new(self.size_bytes.load(Ordering::Relaxed)),
            entry_count: AtomicU64::new(self.entry_count.load(Ordering::Relaxed)),
            eviction_runs: AtomicU64::new(self.eviction_runs.load(Ordering::Relaxed)),
        }
    }

    fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.evictions,
            &self.expired,
            &self.size_bytes,
            &self.entry_count,
            &self.eviction_runs,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Memory-bounded LRU cache of image payloads keyed by source string.
pub struct ImageCache {
    cache: RwLock<LruCache<String, CachedImage>>,
    max_bytes: u64,
    default_ttl: Duration,
    stats: ImageCacheStats,
}

impl ImageCache {
    /// Create a cache holding at most `max_size_mb` megabytes.
    ///
    /// # Example
    /// ```
    /// use storage::ImageCache;
    ///
    /// // 64MB, entries live for 10 minutes
    /// let cache = ImageCache::new(64, 600);
    /// assert_eq!(cache.max_bytes(), 64 * 1024 * 1024);
    /// ```
    pub fn new(max_size_mb: usize, default_ttl_secs: u64) -> Self {
        Self::with_byte_limit((max_size_mb as u64) * 1024 * 1024, default_ttl_secs)
    }

    /// Create a cache with an exact byte budget.
    pub fn with_byte_limit(max_bytes: u64, default_ttl_secs: u64) -> Self {
        let capacity = NonZeroUsize::new(LRU_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            max_bytes,
            default_ttl: Duration::from_secs(default_ttl_secs),
            stats: ImageCacheStats::default(),
        }
    }

    /// Fetch a payload, or `None` when missing or expired.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        // LRU reads reorder entries, so even lookups need the write lock.
        let mut cache = self.cache.write().await;

        let expired = match cache.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.data.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            if let Some(entry) = cache.pop(key) {
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .size_bytes
                    .fetch_sub(entry.data.len() as u64, Ordering::Relaxed);
                self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
                debug!(key = %key, "Image cache entry expired");
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a payload. Payloads larger than the whole budget are not cached.
    pub async fn set(&self, key: &str, data: Bytes, ttl: Option<Duration>) {
        let size = data.len() as u64;
        if size > self.max_bytes {
            debug!(key = %key, size, max_bytes = self.max_bytes, "Image too large to cache");
            return;
        }

        let mut cache = self.cache.write().await;

        if let Some(existing) = cache.pop(key) {
            self.stats
                .size_bytes
                .fetch_sub(existing.data.len() as u64, Ordering::Relaxed);
            self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
        }

        if self.stats.size_bytes.load(Ordering::Relaxed) + size > self.max_bytes {
            self.evict_batch_locked(&mut cache, size);
        }

        cache.put(
            key.to_string(),
            CachedImage {
                data,
                inserted_at: Instant::now(),
                ttl: ttl.unwrap_or(self.default_ttl),
            },
        );
        self.stats.size_bytes.fetch_add(size, Ordering::Relaxed);
        self.stats.entry_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Free at least 5% of the budget, and at least `incoming` bytes of
    /// headroom, from the LRU end. Caller holds the lock.
    fn evict_batch_locked(&self, cache: &mut LruCache<String, CachedImage>, incoming: u64) {
        let current = self.stats.size_bytes.load(Ordering::Relaxed);
        let needed = (current + incoming).saturating_sub(self.max_bytes);
        let target_free = needed.max(self.max_bytes / 20);

        let mut bytes_freed = 0u64;
        let mut entries_evicted = 0u64;
        while bytes_freed < target_free {
            match cache.pop_lru() {
                Some((_, evicted)) => {
                    bytes_freed += evicted.data.len() as u64;
                    entries_evicted += 1;
                }
                None => break,
            }
        }

        self.stats.size_bytes.fetch_sub(bytes_freed, Ordering::Relaxed);
        self.stats
            .entry_count
            .fetch_sub(entries_evicted, Ordering::Relaxed);
        self.stats
            .evictions
            .fetch_add(entries_evicted, Ordering::Relaxed);
        self.stats.eviction_runs.fetch_add(1, Ordering::Relaxed);

        info!(
            entries_evicted,
            bytes_freed_mb = format!("{:.2}", bytes_freed as f64 / (1024.0 * 1024.0)),
            max_size_mb = format!("{:.2}", self.max_bytes as f64 / (1024.0 * 1024.0)),
            "Image cache batch eviction completed"
        );
    }

    /// Point-in-time copy of the counters.
    pub fn stats(&self) -> ImageCacheStats {
        self.stats.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.stats.entry_count.load(Ordering::Relaxed) as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.stats.entry_count.load(Ordering::Relaxed) == 0
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.stats.size_bytes.load(Ordering::Relaxed)
    }

    /// Fraction of the byte budget in use (0.0 - 1.0).
    pub fn utilization(&self) -> f64 {
        if self.max_bytes == 0 {
            0.0
        } else {
            self.size_bytes() as f64 / self.max_bytes as f64
        }
    }

    /// Drop every entry and reset the counters.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        self.stats.reset();
    }
}
