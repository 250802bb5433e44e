//! Session views over live or cached data.
//!
//! Analysis and chart code consume [`SessionView`] and never branch on where
//! the data came from. [`SessionSource`] is the tagged union handed to them:
//! a session fetched just now or one restored from the cache.

use crate::{
    normalize_session, EventMetadata, LapTable, RaceRecord, RawSession, ResultTable, SchemaError,
    WeatherSample,
};

/// The uniform session shape: laps, results, and event metadata.
pub trait SessionView {
    fn laps(&self) -> &LapTable;

    fn results(&self) -> &ResultTable;

    fn event(&self) -> &EventMetadata;

    fn weather(&self) -> &[WeatherSample];

    /// Race distance, or the number of distinct lap numbers when the source
    /// did not report one.
    fn total_laps(&self) -> u32;
}

/// Read-only view over a cached record.
///
/// Pure composition: building one copies the tables and computes nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSessionView {
    laps: LapTable,
    results: ResultTable,
    event: EventMetadata,
    weather: Vec<WeatherSample>,
    total_laps: u32,
}

impl CachedSessionView {
    pub fn new(record: &RaceRecord, year: i32) -> Self {
        Self {
            laps: LapTable::new(record.laps.clone()),
            results: ResultTable::new(record.results.clone()),
            event: EventMetadata::new(record.event_info.name.clone(), year, record.event_info.date),
            weather: record.weather.clone(),
            total_laps: record.event_info.total_laps,
        }
    }
}

impl SessionView for CachedSessionView {
    fn laps(&self) -> &LapTable {
        &self.laps
    }

    fn results(&self) -> &ResultTable {
        &self.results
    }

    fn event(&self) -> &EventMetadata {
        &self.event
    }

    fn weather(&self) -> &[WeatherSample] {
        &self.weather
    }

    fn total_laps(&self) -> u32 {
        self.total_laps
    }
}

/// A session fetched from the remote source in this process.
///
/// Keeps the raw tables next to the normalized view so callers needing
/// provider columns outside the flat schema can still reach them.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSession {
    raw: RawSession,
    record: RaceRecord,
    view: CachedSessionView,
}

impl LiveSession {
    /// Normalize a raw session. Fails only on required-column-missing.
    pub fn from_raw(raw: RawSession, year: i32) -> Result<Self, SchemaError> {
        let record = normalize_session(&raw)?;
        let view = CachedSessionView::new(&record, year);
        Ok(Self { raw, record, view })
    }

    pub fn raw(&self) -> &RawSession {
        &self.raw
    }

    /// The flat record this session persists as.
    pub fn record(&self) -> &RaceRecord {
        &self.record
    }

    pub fn into_record(self) -> RaceRecord {
        self.record
    }
}

impl SessionView for LiveSession {
    fn laps(&self) -> &LapTable {
        self.view.laps()
    }

    fn results(&self) -> &ResultTable {
        self.view.results()
    }

    fn event(&self) -> &EventMetadata {
        self.view.event()
    }

    fn weather(&self) -> &[WeatherSample] {
        self.view.weather()
    }

    fn total_laps(&self) -> u32 {
        self.view.total_laps()
    }
}

/// Either kind of session behind one interface.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSource {
    Live(LiveSession),
    Cached(CachedSessionView),
}

impl SessionSource {
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }

    fn view(&self) -> &dyn SessionView {
        match self {
            Self::Live(session) => session,
            Self::Cached(view) => view,
        }
    }
}

impl From<LiveSession> for SessionSource {
    fn from(session: LiveSession) -> Self {
        Self::Live(session)
    }
}

impl From<CachedSessionView> for SessionSource {
    fn from(view: CachedSessionView) -> Self {
        Self::Cached(view)
    }
}

impl SessionView for SessionSource {
    fn laps(&self) -> &LapTable {
        self.view().laps()
    }

    fn results(&self) -> &ResultTable {
        self.view().results()
    }

    fn event(&self) -> &EventMetadata {
        self.view().event()
    }

    fn weather(&self) -> &[WeatherSample] {
        self.view().weather()
    }

    fn total_laps(&self) -> u32 {
        self.view().total_laps()
    }
}
