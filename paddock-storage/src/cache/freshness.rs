//! Freshness contracts for cache reads.
//!
//! Entry age is measured from the file's last-write time. An entry is usable
//! only while its age is strictly below the caller's tolerance.

use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

/// Freshness requirement for cache reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// Accept a cached entry younger than `max_staleness`; otherwise fetch.
    BestEffort {
        /// Entries at least this old are treated as absent.
        max_staleness: Duration,
    },

    /// Ignore any cached entry and fetch. The fetched record still replaces
    /// the cached one.
    Refresh,
}

impl Freshness {
    /// Create a BestEffort freshness with the given max staleness.
    pub fn best_effort(max_staleness: Duration) -> Self {
        Self::BestEffort { max_staleness }
    }

    /// Returns true if cached entries are bypassed.
    pub fn is_refresh(&self) -> bool {
        matches!(self, Self::Refresh)
    }

    /// Whether an entry of the given age satisfies this requirement.
    pub fn accepts(&self, age: Duration) -> bool {
        match self {
            Self::BestEffort { max_staleness } => age < *max_staleness,
            Self::Refresh => false,
        }
    }
}

/// Last-write time of a cache file, or `None` if it cannot be read.
pub fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
}

/// Age of a cache file. Modification times in the future count as age zero.
pub fn entry_age(path: &Path) -> Option<Duration> {
    let modified = modified_at(path)?;
    Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO),
    )
}

/// True iff `path` exists and its age is strictly less than `max_age`.
pub fn is_valid(path: &Path, max_age: Duration) -> bool {
    entry_age(path).is_some_and(|age| age < max_age)
}

/// Result of a cache read, carrying staleness metadata.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    /// The cached value.
    value: T,
    /// When this value was written to the cache (or fetched, on a miss).
    cached_at: DateTime<Utc>,
    /// Whether this was a cache hit or miss.
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// Create a new cache read from a cache hit.
    pub fn from_cache(value: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at,
            was_cache_hit: true,
        }
    }

    /// Create a new cache read from a fresh fetch (cache miss).
    pub fn from_source(value: T) -> Self {
        Self {
            value,
            cached_at: Utc::now(),
            was_cache_hit: false,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Get a reference to the underlying value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Duration since the data was cached.
    pub fn staleness(&self) -> Duration {
        (Utc::now() - self.cached_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Get when this value was cached.
    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// Check if this was a cache hit.
    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    /// Check if this was a cache miss (fetched from the source).
    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(86_400);

    fn backdate(path: &Path, by: Duration) {
        let file = File::options()
            .write(true)
            .open(path)
            .expect("open for backdating");
        file.set_modified(SystemTime::now() - by)
            .expect("set mtime");
    }

    #[test]
    fn test_freshness_best_effort() {
        let freshness = Freshness::best_effort(Duration::from_secs(60));
        assert!(!freshness.is_refresh());
        assert!(freshness.accepts(Duration::from_secs(59)));
        assert!(!freshness.accepts(Duration::from_secs(60)));
    }

    #[test]
    fn test_freshness_refresh_accepts_nothing() {
        let freshness = Freshness::Refresh;
        assert!(freshness.is_refresh());
        assert!(!freshness.accepts(Duration::ZERO));
    }

    #[test]
    fn test_is_valid_missing_path() {
        let dir = TempDir::new().expect("temp dir");
        assert!(!is_valid(&dir.path().join("absent.json"), 30 * DAY));
    }

    #[test]
    fn test_is_valid_fresh_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("entry.json");
        std::fs::write(&path, b"[]").expect("write");
        assert!(is_valid(&path, 30 * DAY));
    }

    #[test]
    fn test_is_valid_stale_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("entry.json");
        std::fs::write(&path, b"[]").expect("write");

        backdate(&path, 31 * DAY);
        assert!(!is_valid(&path, 30 * DAY));

        backdate(&path, 29 * DAY);
        assert!(is_valid(&path, 30 * DAY));
    }

    #[test]
    fn test_future_mtime_counts_as_fresh() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("entry.json");
        std::fs::write(&path, b"[]").expect("write");
        File::options()
            .write(true)
            .open(&path)
            .and_then(|f| f.set_modified(SystemTime::now() + DAY))
            .expect("set future mtime");

        assert_eq!(entry_age(&path), Some(Duration::ZERO));
        assert!(is_valid(&path, DAY));
    }

    #[test]
    fn test_cache_read_from_cache() {
        let cached_at = Utc::now() - chrono::Duration::seconds(5);
        let read = CacheRead::from_cache("record", cached_at);

        assert!(read.was_cache_hit());
        assert!(!read.was_cache_miss());
        assert_eq!(read.cached_at(), cached_at);
        assert!(read.staleness() >= Duration::from_secs(4));
    }

    #[test]
    fn test_cache_read_from_source() {
        let before = Utc::now();
        let read = CacheRead::from_source(42i32);
        assert!(read.was_cache_miss());
        assert!(read.cached_at() >= before);
        assert_eq!(read.into_value(), 42);
    }
}
