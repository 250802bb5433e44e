//! Read-through session cache.
//!
//! Maps `(year, event, session type)` to a [`RaceRecord`], using one file per
//! key as a write-through cache over the remote source.
//!
//! Only two conditions reach the caller: the source could not deliver the
//! session (data unavailable) and the results table lacked a required
//! column. Stale, absent, vanished, or corrupt cache files are recovered as
//! misses, and a failure to persist a fetched record is logged while the
//! record is still returned.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use paddock_core::{
    normalize_session, CacheConfig, CacheError, CachedSessionView, PaddockResult, RaceRecord,
    SessionFetcher, SessionType,
};
use tracing::{debug, info, warn};

use super::file_store::FileStore;
use super::freshness::{modified_at, CacheRead, Freshness};
use super::key::CacheKey;
use super::stats::CacheStats;

/// Write-through cache over a [`SessionFetcher`].
///
/// # Example
///
/// ```ignore
/// let cache = SessionCache::new(CacheConfig::from_env(), fetcher)?;
///
/// // Served from disk when a file younger than 30 days exists
/// let record = cache.load(2024, "Monaco Grand Prix", SessionType::Race)?;
///
/// // Bypass the cached file and replace it
/// let read = cache.read(2024, "Monaco Grand Prix", SessionType::Race, Freshness::Refresh)?;
/// assert!(read.was_cache_miss());
/// ```
#[derive(Debug)]
pub struct SessionCache<F> {
    /// Cache configuration.
    config: CacheConfig,
    /// Persistence for cached records.
    store: FileStore,
    /// The remote source consulted on a miss.
    fetcher: F,
    /// Usage counters.
    stats: RwLock<CacheStats>,
}

impl<F: SessionFetcher> SessionCache<F> {
    /// Create a session cache. Fails only if the configuration is invalid.
    pub fn new(config: CacheConfig, fetcher: F) -> PaddockResult<Self> {
        config.validate()?;
        Ok(Self {
            store: FileStore::new(config.cache_dir.clone()),
            config,
            fetcher,
            stats: RwLock::new(CacheStats::default()),
        })
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a reference to the remote source.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Path of the file backing a session.
    pub fn resolve_cache_path(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
    ) -> PathBuf {
        CacheKey::new(year, event_name, session_type).path_in(&self.config.cache_dir)
    }

    /// Whether the file at `path` exists and is younger than the configured
    /// maximum age.
    pub fn is_valid(&self, path: &Path) -> bool {
        super::freshness::is_valid(path, self.config.max_age)
    }

    /// Load a session, from disk when a valid entry exists.
    pub fn load(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
    ) -> PaddockResult<RaceRecord> {
        self.read(
            year,
            event_name,
            session_type,
            Freshness::best_effort(self.config.max_age),
        )
        .map(CacheRead::into_value)
    }

    /// Load a session and wrap it in the session view chart code consumes.
    pub fn load_view(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
    ) -> PaddockResult<CachedSessionView> {
        let record = self.load(year, event_name, session_type)?;
        Ok(CachedSessionView::new(&record, year))
    }

    /// Load a session under an explicit freshness requirement.
    ///
    /// Returns a `CacheRead` recording whether the file was used and when it
    /// was written.
    pub fn read(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
        freshness: Freshness,
    ) -> PaddockResult<CacheRead<RaceRecord>> {
        let key = CacheKey::new(year, event_name, session_type);
        let path = key.path_in(&self.config.cache_dir);

        if let Some(read) = self.read_cached(&key, &path, &freshness) {
            self.record(|stats| stats.hits += 1);
            return Ok(read);
        }

        self.record(|stats| stats.misses += 1);
        self.fetch_and_cache(&key, event_name, &path)
    }

    /// Try the file for `key`. Any failure is a miss.
    fn read_cached(
        &self,
        key: &CacheKey,
        path: &Path,
        freshness: &Freshness,
    ) -> Option<CacheRead<RaceRecord>> {
        if freshness.is_refresh() {
            debug!(key = %key, "Refresh requested, bypassing cache");
            return None;
        }

        let modified = modified_at(path)?;
        let age = modified.elapsed().unwrap_or_default();
        if !freshness.accepts(age) {
            debug!(key = %key, age_secs = age.as_secs(), "Cache entry stale");
            return None;
        }

        match self.store.read(path) {
            Ok(record) => {
                debug!(key = %key, path = %path.display(), "Cache hit");
                Some(CacheRead::from_cache(record, DateTime::<Utc>::from(modified)))
            }
            Err(e @ CacheError::Io { .. }) => {
                // Removed or replaced after the age check
                debug!(key = %key, error = %e, "Cache entry vanished, refetching");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache entry corrupt, refetching");
                self.record(|stats| stats.corrupt_entries += 1);
                None
            }
        }
    }

    /// Fetch from the source, normalize, persist, and return the record.
    fn fetch_and_cache(
        &self,
        key: &CacheKey,
        event_name: &str,
        path: &Path,
    ) -> PaddockResult<CacheRead<RaceRecord>> {
        info!(key = %key, "Fetching session from source");
        self.record(|stats| stats.fetches += 1);

        let raw = self
            .fetcher
            .fetch_session(key.year(), event_name, key.session_type())?;
        let record = normalize_session(&raw)?;

        match self.store.write(path, &record) {
            Ok(()) => {
                info!(
                    key = %key,
                    path = %path.display(),
                    laps = record.laps.len(),
                    "Session cached"
                );
                self.record(|stats| stats.writes += 1);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to persist session, serving uncached");
                self.record(|stats| stats.write_failures += 1);
            }
        }

        Ok(CacheRead::from_source(record))
    }

    /// Remove one session's file. Returns whether a file was removed.
    pub fn invalidate(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
    ) -> PaddockResult<bool> {
        let key = CacheKey::new(year, event_name, session_type);
        let removed = self.store.remove(&key.path_in(&self.config.cache_dir))?;
        debug!(key = %key, removed, "Invalidated cache entry");
        Ok(removed)
    }

    /// Remove the whole cache directory. Returns the number of files removed.
    pub fn clear(&self) -> PaddockResult<u64> {
        let removed = self.store.clear()?;
        info!(dir = %self.config.cache_dir.display(), removed, "Cleared session cache");
        Ok(removed)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.write() {
            update(&mut stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_core::{Frame, RawEvent, RawSession, Row, SessionView, SourceError};
    use serde_json::json;
    use std::cell::Cell;
    use std::time::Duration;
    use tempfile::TempDir;

    // Minimal fetcher; the richer fixtures live in paddock-test-utils.
    struct CountingFetcher {
        calls: Cell<u32>,
    }

    impl SessionFetcher for CountingFetcher {
        fn fetch_session(
            &self,
            _year: i32,
            event_name: &str,
            _session_type: SessionType,
        ) -> Result<RawSession, SourceError> {
            self.calls.set(self.calls.get() + 1);
            let row = |v: serde_json::Value| -> Row { v.as_object().cloned().unwrap_or_default() };
            Ok(RawSession {
                results: Frame::from_rows(vec![row(
                    json!({"Abbreviation": "VER", "GridPosition": 1, "Position": 1}),
                )]),
                laps: Frame::from_rows(vec![row(
                    json!({"Driver": "VER", "LapNumber": 1, "LapTime": 80.25, "Stint": 1}),
                )]),
                weather: None,
                event: RawEvent {
                    name: event_name.to_string(),
                    date: None,
                    total_laps: Some(1),
                },
            })
        }
    }

    fn create_test_cache() -> (SessionCache<CountingFetcher>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = CacheConfig::new().with_cache_dir(temp_dir.path().join("cache"));
        let cache = SessionCache::new(
            config,
            CountingFetcher {
                calls: Cell::new(0),
            },
        )
        .expect("valid config");
        (cache, temp_dir)
    }

    #[test]
    fn test_miss_then_hit() {
        let (cache, _temp_dir) = create_test_cache();

        let freshness = Freshness::best_effort(Duration::from_secs(60));
        let first = cache
            .read(2024, "Monaco Grand Prix", SessionType::Race, freshness.clone())
            .expect("first read");
        assert!(first.was_cache_miss());

        let second = cache
            .read(2024, "Monaco Grand Prix", SessionType::Race, freshness)
            .expect("second read");
        assert!(second.was_cache_hit());
        assert_eq!(first.value(), second.value());
        assert_eq!(cache.fetcher().calls.get(), 1);
    }

    #[test]
    fn test_refresh_bypasses_cache() {
        let (cache, _temp_dir) = create_test_cache();
        cache
            .load(2024, "Monaco Grand Prix", SessionType::Race)
            .expect("load");

        let read = cache
            .read(2024, "Monaco Grand Prix", SessionType::Race, Freshness::Refresh)
            .expect("refresh");
        assert!(read.was_cache_miss());
        assert_eq!(cache.fetcher().calls.get(), 2);
        assert_eq!(cache.stats().writes, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CacheConfig::new().with_max_age(Duration::ZERO);
        let result = SessionCache::new(config, CountingFetcher { calls: Cell::new(0) });
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_cache_path_under_config_dir() {
        let (cache, temp_dir) = create_test_cache();
        let path = cache.resolve_cache_path(2024, "British Grand Prix", SessionType::Race);
        assert_eq!(
            path,
            temp_dir.path().join("cache").join("2024_british_grand_prix_race.json")
        );
        assert!(!cache.is_valid(&path));
    }

    #[test]
    fn test_load_view_uses_key_year() {
        let (cache, _temp_dir) = create_test_cache();
        let view = cache
            .load_view(2021, "Abu Dhabi Grand Prix", SessionType::Race)
            .expect("load view");

        assert_eq!(view.event().year(), 2021);
        assert_eq!(view.event().name(), "Abu Dhabi Grand Prix");
    }
}
