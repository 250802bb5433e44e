//! File-backed record store.
//!
//! One JSON file per key, holding a single-row table whose row is the
//! record. Writes go to a temporary file in the cache directory that is then
//! renamed over the target, so readers see either the old file or the new
//! one and never a partial write. With concurrent writers to the same key
//! the last rename wins.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use paddock_core::{CacheError, RaceRecord};
use tempfile::NamedTempFile;

use super::key::CACHE_FILE_EXTENSION;

/// Reads and writes race records under one cache directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

fn io_error(path: &Path, err: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the record stored at `path`.
    ///
    /// A missing file, unparsable content, or a table that does not hold
    /// exactly one row are all errors; callers treat any of them as a miss.
    pub fn read(&self, path: &Path) -> Result<RaceRecord, CacheError> {
        let bytes = fs::read(path).map_err(|e| io_error(path, e))?;

        let mut rows: Vec<RaceRecord> =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(CacheError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("expected exactly one record, found {n}"),
            }),
        }
    }

    /// Atomically replace the record at `path`.
    pub fn write(&self, path: &Path, record: &RaceRecord) -> Result<(), CacheError> {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(self.dir.as_path());
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        let bytes = serde_json::to_vec(&[record]).map_err(|e| CacheError::Serialization {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
        tmp.write_all(&bytes).map_err(|e| io_error(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| io_error(path, e.error))?;

        Ok(())
    }

    /// Delete the record at `path`. Returns whether a file was removed.
    pub fn remove(&self, path: &Path) -> Result<bool, CacheError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path, e)),
        }
    }

    /// Number of cache files currently in the directory.
    pub fn entry_count(&self) -> Result<u64, CacheError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        let count = entries
            .filter_map(Result::ok)
            .filter(|entry| {
                entry.path().extension().and_then(|ext| ext.to_str())
                    == Some(CACHE_FILE_EXTENSION)
            })
            .count();
        Ok(count as u64)
    }

    /// Remove the whole cache directory. Returns the number of cache files
    /// that were in it. A directory that is already gone counts as cleared.
    pub fn clear(&self) -> Result<u64, CacheError> {
        let count = self.entry_count()?;
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(count),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(io_error(&self.dir, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_core::{EventInfo, LapRow, ResultRow};
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp_dir.path().join("cache"));
        (store, temp_dir)
    }

    fn record() -> RaceRecord {
        RaceRecord {
            results: vec![ResultRow {
                driver: "VER".to_string(),
                team: Some("Red Bull Racing".to_string()),
                driver_number: Some(1),
                grid_position: Some(1),
                finish_position: Some(1),
            }],
            laps: vec![LapRow {
                driver: "VER".to_string(),
                driver_number: Some(1),
                lap_number: 1,
                lap_time: Some(Duration::new(81, 123_456_789)),
                position: Some(1),
                compound: Some("SOFT".to_string()),
                tyre_life: Some(1),
                stint: Some(1),
            }],
            weather: vec![],
            event_info: EventInfo {
                name: "Bahrain Grand Prix".to_string(),
                date: None,
                total_laps: 57,
            },
        }
    }

    #[test]
    fn test_write_then_read() {
        let (store, _temp_dir) = create_test_store();
        let path = store.dir().join("2024_bahrain_grand_prix_race.json");

        store.write(&path, &record()).expect("write should succeed");
        assert_eq!(store.read(&path).expect("read should succeed"), record());
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let (store, _temp_dir) = create_test_store();
        assert!(!store.dir().exists());

        let path = store.dir().join("entry.json");
        store.write(&path, &record()).expect("write should succeed");
        assert!(path.exists());
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let (store, _temp_dir) = create_test_store();
        let path = store.dir().join("entry.json");

        store.write(&path, &record()).expect("first write");
        let mut updated = record();
        updated.event_info.total_laps = 58;
        store.write(&path, &updated).expect("second write");

        assert_eq!(store.read(&path).expect("read").event_info.total_laps, 58);
        let files = fs::read_dir(store.dir()).expect("read dir").count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let (store, _temp_dir) = create_test_store();
        let err = store.read(&store.dir().join("absent.json")).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn test_read_corrupt_file() {
        let (store, _temp_dir) = create_test_store();
        fs::create_dir_all(store.dir()).expect("mkdir");

        let garbage = store.dir().join("garbage.json");
        fs::write(&garbage, b"{not json").expect("write");
        assert!(matches!(store.read(&garbage), Err(CacheError::Corrupt { .. })));

        let empty_table = store.dir().join("empty.json");
        fs::write(&empty_table, b"[]").expect("write");
        assert!(matches!(store.read(&empty_table), Err(CacheError::Corrupt { .. })));
    }

    #[test]
    fn test_remove() {
        let (store, _temp_dir) = create_test_store();
        let path = store.dir().join("entry.json");
        store.write(&path, &record()).expect("write");

        assert!(store.remove(&path).expect("remove"));
        assert!(!store.remove(&path).expect("second remove"));
    }

    #[test]
    fn test_clear_counts_entries_and_tolerates_missing_dir() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.clear().expect("clear empty"), 0);

        for name in ["a.json", "b.json"] {
            store.write(&store.dir().join(name), &record()).expect("write");
        }
        assert_eq!(store.entry_count().expect("count"), 2);
        assert_eq!(store.clear().expect("clear"), 2);
        assert!(!store.dir().exists());
    }
}
