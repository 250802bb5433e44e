//! Cache keys and their file paths.
//!
//! A key is `(year, event name, session type)`. The event name is folded into
//! a filesystem-safe token so that incidental capitalization or spacing
//! differences upstream always land on the same file.

use std::fmt;
use std::path::{Path, PathBuf};

use paddock_core::SessionType;

/// Extension of every cache file.
pub const CACHE_FILE_EXTENSION: &str = "json";

/// Identity of one persisted session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    year: i32,
    event: String,
    session_type: SessionType,
}

impl CacheKey {
    /// Create a key. The event name is normalized on construction.
    pub fn new(year: i32, event_name: &str, session_type: SessionType) -> Self {
        Self {
            year,
            event: normalize_event_name(event_name),
            session_type,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The normalized event token.
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    /// `{year}_{event}_{session}.json`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.{}",
            self.year,
            self.event,
            self.session_type.as_str(),
            CACHE_FILE_EXTENSION
        )
    }

    /// Full path of this key's file under `cache_dir`.
    pub fn path_in(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(self.file_name())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.event, self.session_type)
    }
}

/// Trim the name, lower-case it, and replace whitespace and any character
/// that is not alphanumeric, `-`, or `_` with `_`.
///
/// Punctuation is folded too, so `"St. Peter's Grand Prix"` becomes
/// `st__peter_s_grand_prix`, not `st._peter's_grand_prix`.
pub fn normalize_event_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Deterministic path of the cache file for a session:
/// `{cache_dir}/{year}_{event}_{race|quali}.json`.
///
/// The event token comes from [`normalize_event_name`]. Besides lower-casing
/// and mapping spaces to `_`, it trims the name and maps every other
/// character outside `[alnum-_]` (such as `.`, `'` or `/`) to `_`. Names
/// containing punctuation therefore get different file names than a
/// spaces-only rule would produce.
pub fn resolve_cache_path(
    cache_dir: &Path,
    year: i32,
    event_name: &str,
    session_type: SessionType,
) -> PathBuf {
    CacheKey::new(year, event_name, session_type).path_in(cache_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_file_name_layout() {
        let key = CacheKey::new(2024, "British Grand Prix", SessionType::Race);
        assert_eq!(key.file_name(), "2024_british_grand_prix_race.json");

        let quali = CacheKey::new(2023, "Monaco Grand Prix", SessionType::Qualifying);
        assert_eq!(quali.file_name(), "2023_monaco_grand_prix_quali.json");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let dir = Path::new(".paddock_cache");
        assert_eq!(
            resolve_cache_path(dir, 2024, "British Grand Prix", SessionType::Race),
            resolve_cache_path(dir, 2024, "british grand prix", SessionType::Race),
        );
        assert_eq!(
            resolve_cache_path(dir, 2024, " British Grand Prix ", SessionType::Race),
            resolve_cache_path(dir, 2024, "BRITISH GRAND PRIX", SessionType::Race),
        );
    }

    #[test]
    fn test_session_type_and_year_distinguish_keys() {
        let dir = Path::new("cache");
        let race = resolve_cache_path(dir, 2024, "Monaco Grand Prix", SessionType::Race);
        let quali = resolve_cache_path(dir, 2024, "Monaco Grand Prix", SessionType::Qualifying);
        let older = resolve_cache_path(dir, 2023, "Monaco Grand Prix", SessionType::Race);
        assert_ne!(race, quali);
        assert_ne!(race, older);
    }

    #[test]
    fn test_path_separators_cannot_escape_cache_dir() {
        let key = CacheKey::new(2024, "../../etc/passwd", SessionType::Race);
        assert!(!key.file_name().contains('/'));
        assert_eq!(key.path_in(Path::new("cache")).parent(), Some(Path::new("cache")));
    }

    #[test]
    fn test_punctuation_is_folded() {
        let key = CacheKey::new(2024, " St. Peter's Grand Prix ", SessionType::Race);
        assert_eq!(key.event(), "st__peter_s_grand_prix");
        assert_eq!(key.file_name(), "2024_st__peter_s_grand_prix_race.json");
    }

    #[test]
    fn test_display() {
        let key = CacheKey::new(2024, "São Paulo Grand Prix", SessionType::Race);
        assert_eq!(key.to_string(), "2024/são_paulo_grand_prix/race");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Case never changes the resolved path.
        #[test]
        fn prop_resolution_ignores_case(name in "[A-Za-z ]{1,30}", year in 1950i32..2100) {
            let dir = Path::new("cache");
            prop_assert_eq!(
                resolve_cache_path(dir, year, &name, SessionType::Race),
                resolve_cache_path(dir, year, &name.to_uppercase(), SessionType::Race)
            );
        }

        /// Resolved paths stay directly inside the cache directory.
        #[test]
        fn prop_resolution_stays_in_dir(name in ".{0,40}", year in 1950i32..2100) {
            let dir = Path::new("cache");
            let path = resolve_cache_path(dir, year, &name, SessionType::Qualifying);
            prop_assert_eq!(path.parent(), Some(dir));
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            prop_assert!(!file_name.chars().any(char::is_whitespace));
        }
    }
}
