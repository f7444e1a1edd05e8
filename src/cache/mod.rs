//! Process-wide key/value cache with per-entry time-to-live.
//!
//! The archive aggregator stores one computed archive per language here.
//! Entries expire after their TTL and the least recently used entry is
//! evicted once `capacity` is reached.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! archive_ttl_seconds = 3600
//! capacity = 64
//! ```

mod config;
mod keys;
mod store;

pub use config::CacheConfig;
pub use keys::{ARCHIVE_KEY_PREFIX, archive_key};
pub use store::{Cache, MemoryCache};
