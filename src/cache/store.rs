//! In-memory cache storage.

use std::sync::{Arc, Mutex};

use lru::LruCache;
use metrics::counter;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::util::clock::Clock;
use crate::util::lock::recover;

use super::config::CacheConfig;

const SOURCE: &str = "cache::store";

/// String-keyed cache with per-entry expiry.
pub trait Cache<V>: Send + Sync {
    /// Returns the live value under `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key` for `ttl`. A non-positive `ttl` stores nothing.
    fn set(&self, key: String, value: V, ttl: Duration);
}

struct CacheEntry<V> {
    value: V,
    expires_at: OffsetDateTime,
}

/// LRU-bounded [`Cache`] kept in process memory.
///
/// Expired entries are dropped lazily when they are read.
pub struct MemoryCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V> MemoryCache<V> {
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.capacity_non_zero())),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        recover(self.entries.lock(), SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Send,
{
    fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = recover(self.entries.lock(), SOURCE, "get");

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                counter!("blogtags_cache_hit_total").increment(1);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            counter!("blogtags_cache_expired_total").increment(1);
            debug!(target = SOURCE, key, "Dropped expired cache entry");
        }
        counter!("blogtags_cache_miss_total").increment(1);
        None
    }

    fn set(&self, key: String, value: V, ttl: Duration) {
        if !ttl.is_positive() {
            return;
        }

        let expires_at = self.clock.now().saturating_add(ttl);
        let mut entries = recover(self.entries.lock(), SOURCE, "set");
        if let Some((evicted, _)) = entries.push(key.clone(), CacheEntry { value, expires_at }) {
            if evicted != key {
                counter!("blogtags_cache_evict_total").increment(1);
                debug!(target = SOURCE, key = %evicted, "Evicted cache entry at capacity");
            }
        }
    }
}
