//! Session cache with explicit freshness contracts.
//!
//! Each `(year, event, session type)` maps to one JSON file under the cache
//! directory. A file is served while it is younger than the configured
//! maximum age; otherwise the session is fetched, normalized, and the file
//! is replaced.
//!
//! Staleness is explicit: [`SessionCache::read`] takes a [`Freshness`] and
//! returns a [`CacheRead<T>`] that says whether the file was used and when it
//! was written. [`SessionCache::load`] is the common case with the configured
//! maximum age.
//!
//! # Example
//!
//! ```ignore
//! let cache = SessionCache::new(CacheConfig::default(), fetcher)?;
//!
//! let record = cache.load(2024, "British Grand Prix", SessionType::Race)?;
//!
//! let read = cache.read(2024, "British Grand Prix", SessionType::Race, Freshness::Refresh)?;
//! if read.staleness() > Duration::from_secs(60) {
//!     tracing::warn!("Session data is getting stale");
//! }
//! ```

pub mod file_store;
pub mod freshness;
pub mod key;
pub mod session_cache;
pub mod stats;

pub use file_store::FileStore;
pub use freshness::{entry_age, is_valid, CacheRead, Freshness};
pub use key::{normalize_event_name, resolve_cache_path, CacheKey, CACHE_FILE_EXTENSION};
pub use session_cache::SessionCache;
pub use stats::CacheStats;
