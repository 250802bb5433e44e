//! Paddock Storage - file-backed session cache.
//!
//! Sits between chart code and the remote timing source. Sessions are
//! fetched once, normalized into a [`paddock_core::RaceRecord`], and served
//! from disk until the entry ages out.

pub mod cache;

pub use cache::{
    entry_age, is_valid, normalize_event_name, resolve_cache_path, CacheKey, CacheRead,
    CacheStats, FileStore, Freshness, SessionCache, CACHE_FILE_EXTENSION,
};

// Re-export the configuration so callers need only this crate to build a cache
pub use paddock_core::CacheConfig;
