//! Configuration types

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, PaddockError, PaddockResult};

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".paddock_cache";

/// Default maximum age of a cache entry in days.
pub const DEFAULT_MAX_AGE_DAYS: u64 = 30;

const SECS_PER_DAY: u64 = 86_400;

/// Session cache configuration.
///
/// Constructed explicitly and handed to the cache; there is no process-wide
/// cache switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one file per cached session.
    pub cache_dir: PathBuf,
    /// Entries at least this old are treated as absent.
    pub max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_DAYS * SECS_PER_DAY),
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the maximum entry age.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the maximum entry age in whole days.
    pub fn with_max_age_days(self, days: u64) -> Self {
        self.with_max_age(Duration::from_secs(days.saturating_mul(SECS_PER_DAY)))
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `PADDOCK_CACHE_DIR`: cache directory (default: `.paddock_cache`)
    /// - `PADDOCK_CACHE_MAX_AGE_DAYS`: maximum entry age in days (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cache_dir = std::env::var("PADDOCK_CACHE_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let max_age = std::env::var("PADDOCK_CACHE_MAX_AGE_DAYS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|days| Duration::from_secs(days.saturating_mul(SECS_PER_DAY)))
            .unwrap_or(defaults.max_age);

        Self { cache_dir, max_age }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> PaddockResult<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(PaddockError::Config(ConfigError::InvalidValue {
                field: "cache_dir".to_string(),
                value: String::new(),
                reason: "cache_dir must not be empty".to_string(),
            }));
        }

        if self.max_age.is_zero() {
            return Err(PaddockError::Config(ConfigError::InvalidValue {
                field: "max_age".to_string(),
                value: format!("{:?}", self.max_age),
                reason: "max_age must be positive".to_string(),
            }));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_dir, PathBuf::from(".paddock_cache"));
        assert_eq!(config.max_age, Duration::from_secs(30 * 86_400));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::new()
            .with_cache_dir("/tmp/paddock")
            .with_max_age_days(7);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/paddock"));
        assert_eq!(config.max_age, Duration::from_secs(7 * 86_400));
    }

    #[test]
    fn test_validate_rejects_zero_age() {
        let err = CacheConfig::new()
            .with_max_age(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            PaddockError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "max_age"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_dir() {
        let err = CacheConfig::new().with_cache_dir("").validate().unwrap_err();
        assert!(matches!(err, PaddockError::Config(_)));
    }
}
