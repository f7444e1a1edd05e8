//! Cache configuration.

use std::num::NonZeroUsize;

use time::Duration;

const DEFAULT_ARCHIVE_TTL_SECS: u64 = 60 * 60;
const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve archives from the cache; when off every call recomputes.
    pub enabled: bool,
    /// Lifetime of a cached archive in seconds.
    pub archive_ttl_seconds: u64,
    /// Maximum number of cached entries.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            archive_ttl_seconds: DEFAULT_ARCHIVE_TTL_SECS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            archive_ttl_seconds: settings.archive_ttl.get(),
            capacity: settings.capacity.get(),
        }
    }
}

impl CacheConfig {
    pub fn archive_ttl(&self) -> Duration {
        Duration::seconds(i64::try_from(self.archive_ttl_seconds).unwrap_or(i64::MAX))
    }

    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
