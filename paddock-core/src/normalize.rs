//! Normalization of raw source sessions into flat [`RaceRecord`]s.
//!
//! Only the results table can make normalization fail: a record without
//! finishing or grid positions is useless to every consumer. Everything else
//! degrades to `None` fields or empty sequences and is logged.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::columns::{self, DRIVER_NUMBER, FINISH_POSITION, GRID_POSITION, RESULT_DRIVER, TEAM_NAME};
use crate::{
    EventInfo, Frame, LapRow, RaceRecord, RawSession, ResultRow, SchemaError, WeatherSample,
};

/// Flatten a raw session into a persistable record.
pub fn normalize_session(raw: &RawSession) -> Result<RaceRecord, SchemaError> {
    let results = normalize_results(&raw.results)?;
    let laps = normalize_laps(&raw.laps);
    let weather = match &raw.weather {
        Some(frame) => normalize_weather(frame),
        None => {
            debug!(event = %raw.event.name, "Session has no weather table");
            Vec::new()
        }
    };

    let total_laps = raw.event.total_laps.unwrap_or_else(|| {
        let distinct: BTreeSet<u32> = laps.iter().map(|lap| lap.lap_number).collect();
        distinct.len() as u32
    });

    Ok(RaceRecord {
        results,
        laps,
        weather,
        event_info: EventInfo {
            name: raw.event.name.clone(),
            date: raw.event.date,
            total_laps,
        },
    })
}

/// Resolve the results columns and convert each row.
///
/// Fails when no finishing-position or grid-position candidate exists.
pub fn normalize_results(frame: &Frame) -> Result<Vec<ResultRow>, SchemaError> {
    let finish_col = FINISH_POSITION.require(frame)?;
    let grid_col = GRID_POSITION.require(frame)?;
    let driver_col = RESULT_DRIVER.resolve(frame);
    let team_col = TEAM_NAME.resolve(frame);
    let number_col = DRIVER_NUMBER.resolve(frame);

    let mut results = Vec::with_capacity(frame.len());
    let mut skipped = 0usize;

    for row in frame.rows() {
        let driver_number = number_col.and_then(|c| unsigned(row.get(c)));
        let driver = driver_col
            .and_then(|c| text(row.get(c)))
            .or_else(|| driver_number.map(|n| n.to_string()));

        let Some(driver) = driver else {
            skipped += 1;
            continue;
        };

        results.push(ResultRow {
            driver,
            team: team_col.and_then(|c| text(row.get(c))),
            driver_number,
            grid_position: unsigned(row.get(grid_col)),
            finish_position: unsigned(row.get(finish_col)),
        });
    }

    if skipped > 0 {
        warn!(skipped, "Dropped result rows without a competitor identifier");
    }

    Ok(results)
}

/// Convert the laps table, keeping whatever subset is usable.
pub fn normalize_laps(frame: &Frame) -> Vec<LapRow> {
    if !frame.has_column(columns::laps::DRIVER) || !frame.has_column(columns::laps::LAP_NUMBER) {
        warn!(
            available = ?frame.columns(),
            "Lap table lacks identifying columns, continuing without laps"
        );
        return Vec::new();
    }

    let mut laps = Vec::with_capacity(frame.len());
    let mut seen: HashSet<(String, u32)> = HashSet::with_capacity(frame.len());
    let mut unidentified = 0usize;
    let mut duplicates = 0usize;

    for row in frame.rows() {
        let driver = text(row.get(columns::laps::DRIVER));
        let lap_number = unsigned(row.get(columns::laps::LAP_NUMBER)).filter(|n| *n >= 1);

        let (Some(driver), Some(lap_number)) = (driver, lap_number) else {
            unidentified += 1;
            continue;
        };

        if !seen.insert((driver.clone(), lap_number)) {
            duplicates += 1;
            continue;
        }

        laps.push(LapRow {
            driver,
            driver_number: unsigned(row.get(columns::laps::DRIVER_NUMBER)),
            lap_number,
            lap_time: duration(row.get(columns::laps::LAP_TIME)),
            position: unsigned(row.get(columns::laps::POSITION)),
            compound: text(row.get(columns::laps::COMPOUND)).map(|c| c.to_uppercase()),
            tyre_life: unsigned(row.get(columns::laps::TYRE_LIFE)),
            stint: unsigned(row.get(columns::laps::STINT)),
        });
    }

    if unidentified > 0 {
        warn!(unidentified, "Dropped laps without driver or lap number");
    }
    if duplicates > 0 {
        warn!(duplicates, "Dropped duplicate laps");
    }

    if !frame.has_column(columns::laps::STINT) {
        debug!("Lap table has no stint column, deriving stints from compound changes");
        derive_stints(&mut laps);
    }

    laps
}

/// Number stints per driver from 1, advancing on every compound change.
///
/// Laps with an unknown compound stay in the current stint.
pub fn derive_stints(laps: &mut [LapRow]) {
    let mut by_driver: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, lap) in laps.iter().enumerate() {
        by_driver.entry(lap.driver.clone()).or_default().push(idx);
    }

    for indices in by_driver.values_mut() {
        indices.sort_by_key(|&idx| laps[idx].lap_number);

        let mut stint = 1u32;
        let mut current: Option<String> = None;
        for &idx in indices.iter() {
            if let Some(compound) = &laps[idx].compound {
                match &current {
                    Some(prev) if prev != compound => {
                        stint += 1;
                        current = Some(compound.clone());
                    }
                    None => current = Some(compound.clone()),
                    _ => {}
                }
            }
            laps[idx].stint = Some(stint);
        }
    }
}

/// Convert the weather table. Any structural problem yields no samples.
pub fn normalize_weather(frame: &Frame) -> Vec<WeatherSample> {
    if frame.is_empty() {
        return Vec::new();
    }
    if !frame.has_column(columns::weather::TIME) {
        warn!(available = ?frame.columns(), "Weather table has no time column, skipping weather");
        return Vec::new();
    }

    frame
        .rows()
        .iter()
        .filter_map(|row| {
            Some(WeatherSample {
                time: duration(row.get(columns::weather::TIME))?,
                air_temp: float(row.get(columns::weather::AIR_TEMP)),
                track_temp: float(row.get(columns::weather::TRACK_TEMP)),
                wind_speed: float(row.get(columns::weather::WIND_SPEED)),
                rainfall: flag(row.get(columns::weather::RAINFALL)),
            })
        })
        .collect()
}

// ============================================================================
// VALUE COERCION
// ============================================================================

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn whole_number(f: f64) -> Option<u32> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

/// Non-negative integers, tolerating float encodings (`3.0`) and numeric
/// strings. Status strings such as `"R"` become `None`.
fn unsigned(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => match n.as_u64() {
            Some(u) => u32::try_from(u).ok(),
            None => n.as_f64().and_then(whole_number),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    }
}

fn float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
        _ => false,
    }
}

/// Durations arrive as seconds, as `{secs, nanos}` objects, or as clock
/// text (`1:21.345`, `0 days 00:01:21.345000`).
fn duration(value: Option<&Value>) -> Option<Duration> {
    match value? {
        Value::Number(n) => n.as_f64().and_then(|f| Duration::try_from_secs_f64(f).ok()),
        Value::String(s) => parse_duration_text(s),
        Value::Object(map) => {
            let secs = map.get("secs")?.as_u64()?;
            let nanos = map.get("nanos").and_then(Value::as_u64).unwrap_or(0);
            Duration::from_secs(secs).checked_add(Duration::from_nanos(nanos))
        }
        _ => None,
    }
}

fn parse_duration_text(text: &str) -> Option<Duration> {
    let text = text.trim();
    let (days, clock) = match text.split_once(" days ").or_else(|| text.split_once(" day ")) {
        Some((days, rest)) => (days.trim().parse::<u64>().ok()?, rest.trim()),
        None => (0, text),
    };

    let mut parts = clock.rsplit(':');
    let seconds = parts.next()?.parse::<f64>().ok()?;
    let mut whole_minutes = 0u64;
    let mut scale = 1u64;
    for part in parts {
        let scaled = part.parse::<u64>().ok()?.checked_mul(scale)?;
        whole_minutes = whole_minutes.checked_add(scaled)?;
        scale = scale.checked_mul(60)?;
    }

    // Out-of-range values are unparsable, not wrapped
    let fixed_secs = days
        .checked_mul(86_400)?
        .checked_add(whole_minutes.checked_mul(60)?)?;
    Duration::from_secs(fixed_secs).checked_add(Duration::try_from_secs_f64(seconds).ok()?)
}
