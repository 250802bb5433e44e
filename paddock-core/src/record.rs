//! Flat, persistable race records.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One competitor's classification row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Short competitor code, e.g. `VER`.
    pub driver: String,
    pub team: Option<String>,
    pub driver_number: Option<u32>,
    pub grid_position: Option<u32>,
    /// `None` for unclassified finishers.
    pub finish_position: Option<u32>,
}

/// One timed lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRow {
    pub driver: String,
    pub driver_number: Option<u32>,
    /// 1-based, unique per driver within a session.
    pub lap_number: u32,
    /// Missing for incomplete or invalidated laps.
    pub lap_time: Option<Duration>,
    pub position: Option<u32>,
    /// Upper-case compound label, e.g. `SOFT`.
    pub compound: Option<String>,
    pub tyre_life: Option<u32>,
    pub stint: Option<u32>,
}

/// A weather sample taken during the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Offset from session start.
    pub time: Duration,
    pub air_temp: Option<f64>,
    pub track_temp: Option<f64>,
    pub wind_speed: Option<f64>,
    pub rainfall: bool,
}

/// Event-level metadata kept alongside the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub name: String,
    pub date: Option<DateTime<Utc>>,
    pub total_laps: u32,
}

/// Everything persisted for one `(year, event, session type)` key.
///
/// Records are only ever replaced wholesale; nothing updates one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub results: Vec<ResultRow>,
    pub laps: Vec<LapRow>,
    #[serde(default)]
    pub weather: Vec<WeatherSample>,
    pub event_info: EventInfo,
}
