//! Paddock Test Utilities
//!
//! Shared test infrastructure for the paddock workspace:
//! - Scripted session fetchers standing in for the remote source
//! - Proptest generators for lap and result rows
//! - Raw session fixtures shaped like real source payloads
//! - Assertions for paddock error kinds

// Re-export core types for convenience
pub use paddock_core::{
    CacheConfig, EventInfo, Frame, LapRow, LapTable, PaddockError, PaddockResult, RaceRecord,
    RawEvent, RawSession, ResultRow, Row, SchemaError, SessionFetcher, SessionType, SourceError,
};

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Turn a JSON object literal into a source row. Non-objects become empty
/// rows.
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// Build a frame from a JSON array of objects.
pub fn frame(rows: Value) -> Frame {
    match rows {
        Value::Array(items) => Frame::from_rows(items.into_iter().map(row).collect()),
        _ => Frame::default(),
    }
}

// ============================================================================
// MOCK FETCHERS
// ============================================================================

/// Fetcher that serves a fixed session and counts calls.
///
/// The served event name follows the requested one so that every key gets a
/// distinguishable record.
#[derive(Debug)]
pub struct ScriptedFetcher {
    session: RawSession,
    calls: AtomicUsize,
    requests: Mutex<Vec<(i32, String, SessionType)>>,
}

impl ScriptedFetcher {
    pub fn new(session: RawSession) -> Self {
        Self {
            session,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fetcher serving [`fixtures::monaco_race`].
    pub fn monaco() -> Self {
        Self::new(fixtures::monaco_race())
    }

    /// Number of times the source was consulted.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every `(year, event, session type)` requested, in order.
    pub fn requests(&self) -> Vec<(i32, String, SessionType)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl SessionFetcher for ScriptedFetcher {
    fn fetch_session(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
    ) -> Result<RawSession, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((year, event_name.to_string(), session_type));
        }

        let mut session = self.session.clone();
        session.event.name = event_name.to_string();
        Ok(session)
    }
}

/// Fetcher for a source that is down: every call fails.
#[derive(Debug, Default)]
pub struct FailingFetcher {
    calls: AtomicUsize,
}

impl FailingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SessionFetcher for FailingFetcher {
    fn fetch_session(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
    ) -> Result<RawSession, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Unavailable {
            year,
            event: event_name.to_string(),
            session_type,
            reason: "connection refused".to_string(),
        })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest generators for paddock record types.

    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    /// Three-letter competitor code from a small pool, so tables share
    /// competitors.
    pub fn arb_driver() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["VER", "LEC", "HAM", "NOR", "ALO", "SAI"])
            .prop_map(str::to_string)
    }

    /// Lap time between 60s and 120s with millisecond resolution.
    pub fn arb_lap_time() -> impl Strategy<Value = Duration> {
        (60_000u64..120_000).prop_map(Duration::from_millis)
    }

    pub fn arb_compound() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["SOFT", "MEDIUM", "HARD", "INTERMEDIATE", "WET"])
            .prop_map(str::to_string)
    }

    /// A lap row. About one lap in ten has no time.
    pub fn arb_lap_row() -> impl Strategy<Value = LapRow> {
        (
            arb_driver(),
            1u32..80,
            prop::option::weighted(0.9, arb_lap_time()),
            prop::option::of(1u32..21),
            prop::option::of(arb_compound()),
            1u32..5,
        )
            .prop_map(
                |(driver, lap_number, lap_time, position, compound, stint)| LapRow {
                    driver,
                    driver_number: None,
                    lap_number,
                    lap_time,
                    position,
                    compound,
                    tyre_life: None,
                    stint: Some(stint),
                },
            )
    }

    /// A lap table of up to `max_laps` rows.
    pub fn arb_lap_table(max_laps: usize) -> impl Strategy<Value = LapTable> {
        prop::collection::vec(arb_lap_row(), 0..=max_laps).prop_map(LapTable::new)
    }

    /// A classification row with optional grid and finish positions.
    pub fn arb_result_row() -> impl Strategy<Value = ResultRow> {
        (
            arb_driver(),
            prop::option::of(0u32..21),
            prop::option::of(1u32..21),
        )
            .prop_map(|(driver, grid_position, finish_position)| ResultRow {
                driver,
                team: None,
                driver_number: None,
                grid_position,
                finish_position,
            })
    }

    pub fn arb_session_type() -> impl Strategy<Value = SessionType> {
        prop_oneof![Just(SessionType::Race), Just(SessionType::Qualifying)]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Raw sessions shaped like real source payloads.

    use super::*;
    use chrono::{TimeZone, Utc};

    fn results() -> Frame {
        frame(json!([
            {"Abbreviation": "LEC", "DriverNumber": "16", "TeamName": "Ferrari", "GridPosition": 1.0, "Position": 1.0},
            {"Abbreviation": "PIA", "DriverNumber": "81", "TeamName": "McLaren", "GridPosition": 2.0, "Position": 2.0},
            {"Abbreviation": "SAI", "DriverNumber": "55", "TeamName": "Ferrari", "GridPosition": 3.0, "Position": 3.0},
            {"Abbreviation": "NOR", "DriverNumber": "4", "TeamName": "McLaren", "GridPosition": 4.0, "Position": 4.0},
            {"Abbreviation": "PER", "DriverNumber": "11", "TeamName": "Red Bull Racing", "GridPosition": 16.0, "Position": null}
        ]))
    }

    fn laps() -> Frame {
        frame(json!([
            {"Driver": "LEC", "DriverNumber": "16", "LapNumber": 1.0, "LapTime": 83.412, "Position": 1.0, "Compound": "MEDIUM", "TyreLife": 1.0, "Stint": 1.0},
            {"Driver": "LEC", "DriverNumber": "16", "LapNumber": 2.0, "LapTime": 75.118, "Position": 1.0, "Compound": "MEDIUM", "TyreLife": 2.0, "Stint": 1.0},
            {"Driver": "LEC", "DriverNumber": "16", "LapNumber": 3.0, "LapTime": 95.701, "Position": 1.0, "Compound": "HARD", "TyreLife": 1.0, "Stint": 2.0},
            {"Driver": "LEC", "DriverNumber": "16", "LapNumber": 4.0, "LapTime": 74.972, "Position": 1.0, "Compound": "HARD", "TyreLife": 2.0, "Stint": 2.0},
            {"Driver": "PIA", "DriverNumber": "81", "LapNumber": 1.0, "LapTime": 84.005, "Position": 2.0, "Compound": "MEDIUM", "TyreLife": 1.0, "Stint": 1.0},
            {"Driver": "PIA", "DriverNumber": "81", "LapNumber": 2.0, "LapTime": 75.640, "Position": 2.0, "Compound": "MEDIUM", "TyreLife": 2.0, "Stint": 1.0},
            {"Driver": "PIA", "DriverNumber": "81", "LapNumber": 3.0, "LapTime": 75.502, "Position": 2.0, "Compound": "MEDIUM", "TyreLife": 3.0, "Stint": 1.0},
            {"Driver": "PIA", "DriverNumber": "81", "LapNumber": 4.0, "LapTime": null, "Position": 2.0, "Compound": "MEDIUM", "TyreLife": 4.0, "Stint": 1.0},
            {"Driver": "SAI", "DriverNumber": "55", "LapNumber": 1.0, "LapTime": 84.377, "Position": 3.0, "Compound": "MEDIUM", "TyreLife": 1.0, "Stint": 1.0},
            {"Driver": "SAI", "DriverNumber": "55", "LapNumber": 2.0, "LapTime": 75.910, "Position": 3.0, "Compound": "MEDIUM", "TyreLife": 2.0, "Stint": 1.0}
        ]))
    }

    fn weather() -> Frame {
        frame(json!([
            {"Time": 0.0, "AirTemp": 21.4, "TrackTemp": 42.1, "WindSpeed": 1.3, "Rainfall": false},
            {"Time": 60.0, "AirTemp": 21.5, "TrackTemp": 42.4, "WindSpeed": 1.1, "Rainfall": false},
            {"Time": 120.0, "AirTemp": 21.5, "TrackTemp": 42.9, "WindSpeed": 0.9, "Rainfall": false}
        ]))
    }

    /// A short Monaco race: five classified rows (one DNF), ten laps
    /// including a slow pit lap and an untimed lap, and three weather samples.
    pub fn monaco_race() -> RawSession {
        RawSession {
            results: results(),
            laps: laps(),
            weather: Some(weather()),
            event: RawEvent {
                name: "Monaco Grand Prix".to_string(),
                date: Utc.with_ymd_and_hms(2024, 5, 26, 13, 0, 0).single(),
                total_laps: Some(78),
            },
        }
    }

    /// A qualifying session: no scheduled distance and no weather feed.
    pub fn monaco_qualifying() -> RawSession {
        RawSession {
            weather: None,
            event: RawEvent {
                name: "Monaco Grand Prix".to_string(),
                date: Utc.with_ymd_and_hms(2024, 5, 25, 14, 0, 0).single(),
                total_laps: None,
            },
            ..monaco_race()
        }
    }

    /// A session whose results table carries no finishing-position column
    /// under any known name.
    pub fn session_without_positions() -> RawSession {
        RawSession {
            results: frame(json!([
                {"Abbreviation": "LEC", "GridPosition": 1.0, "Status": "Finished"},
                {"Abbreviation": "PIA", "GridPosition": 2.0, "Status": "Finished"}
            ])),
            ..monaco_race()
        }
    }

    /// A session using the alternate column spellings some source releases
    /// emit.
    pub fn session_with_renamed_columns() -> RawSession {
        RawSession {
            results: frame(json!([
                {"Driver": "LEC", "CarNumber": 16, "Team": "Ferrari", "StartPosition": 1, "ClassifiedPosition": "1"},
                {"Driver": "PIA", "CarNumber": 81, "Team": "McLaren", "StartPosition": 2, "ClassifiedPosition": "2"}
            ])),
            ..monaco_race()
        }
    }

    /// A cache config rooted at `dir`.
    pub fn cache_config(dir: &std::path::Path) -> CacheConfig {
        CacheConfig::new().with_cache_dir(dir.join("paddock_cache"))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for paddock error kinds.

    use super::*;

    /// Assert that a PaddockResult reports the source as unavailable.
    #[track_caller]
    pub fn assert_data_unavailable<T: std::fmt::Debug>(result: &PaddockResult<T>) {
        match result {
            Err(err) if err.is_data_unavailable() => {}
            other => panic!("Expected data-unavailable error, got: {:?}", other),
        }
    }

    /// Assert that a PaddockResult is a missing-column schema error for
    /// `concept`.
    #[track_caller]
    pub fn assert_missing_column<T: std::fmt::Debug>(result: &PaddockResult<T>, concept: &str) {
        match result {
            Err(PaddockError::Schema(SchemaError::MissingColumn { concept: c, .. })) => {
                assert_eq!(c, concept, "Wrong concept in MissingColumn error");
            }
            other => panic!("Expected MissingColumn({}), got: {:?}", concept, other),
        }
    }

    /// Assert that a PaddockResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &PaddockResult<T>) {
        match result {
            Err(PaddockError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_core::normalize_session;

    #[test]
    fn test_monaco_fixture_normalizes() {
        let record = normalize_session(&fixtures::monaco_race()).expect("fixture should normalize");
        assert_eq!(record.results.len(), 5);
        assert_eq!(record.laps.len(), 10);
        assert_eq!(record.weather.len(), 3);
        assert_eq!(record.event_info.total_laps, 78);
    }

    #[test]
    fn test_renamed_columns_fixture_normalizes() {
        let record = normalize_session(&fixtures::session_with_renamed_columns())
            .expect("fallback columns should resolve");
        assert_eq!(record.results[0].finish_position, Some(1));
        assert_eq!(record.results[1].grid_position, Some(2));
    }

    #[test]
    fn test_scripted_fetcher_records_requests() {
        let fetcher = ScriptedFetcher::monaco();
        let session = fetcher
            .fetch_session(2023, "Spanish Grand Prix", SessionType::Qualifying)
            .expect("scripted fetch");

        assert_eq!(session.event.name, "Spanish Grand Prix");
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(
            fetcher.requests(),
            vec![(2023, "Spanish Grand Prix".to_string(), SessionType::Qualifying)]
        );
    }

    #[test]
    fn test_failing_fetcher() {
        let fetcher = FailingFetcher::new();
        let err = fetcher
            .fetch_session(2024, "Monaco Grand Prix", SessionType::Race)
            .unwrap_err();
        assert!(PaddockError::from(err).is_data_unavailable());
        assert_eq!(fetcher.calls(), 1);
    }
}
