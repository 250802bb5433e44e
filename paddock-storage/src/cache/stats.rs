//! Cache usage counters.

/// Statistics about cache usage since the cache was constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Loads served from a valid cache file.
    pub hits: u64,
    /// Loads that had to go to the source.
    pub misses: u64,
    /// Valid-looking entries that failed to deserialize.
    pub corrupt_entries: u64,
    /// Calls made to the source.
    pub fetches: u64,
    /// Records persisted.
    pub writes: u64,
    /// Persistence attempts that failed.
    pub write_failures: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
