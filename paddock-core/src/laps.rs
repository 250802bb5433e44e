//! Lap tables and the representative-lap rule.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::LapRow;

/// Laps slower than the session's fastest lap by more than this factor are
/// outliers (incidents, caution periods, pit entry and exit). Fixed by the
/// sport's 107% convention.
pub const OUTLIER_THRESHOLD: f64 = 1.07;

/// An ordered, immutable table of laps.
///
/// Filters return new tables and never fail; a filter that matches nothing
/// yields an empty table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapTable {
    rows: Vec<LapRow>,
}

/// One contiguous run on a single compound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StintSummary {
    pub driver: String,
    pub stint: u32,
    pub compound: Option<String>,
    pub first_lap: u32,
    pub last_lap: u32,
    pub lap_count: u32,
}

impl LapTable {
    pub fn new(rows: Vec<LapRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[LapRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LapRow> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LapRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Laps driven by one competitor, matched exactly on the short code.
    pub fn filter_by_competitor(&self, competitor_id: &str) -> LapTable {
        self.rows
            .iter()
            .filter(|lap| lap.driver == competitor_id)
            .cloned()
            .collect()
    }

    /// Representative laps only.
    ///
    /// Laps without a time are removed first. The fastest remaining time is
    /// computed once and every lap with `time <= fastest * 1.07` is kept; the
    /// boundary is inclusive.
    pub fn filter_representative(&self) -> LapTable {
        let timed: Vec<&LapRow> = self.rows.iter().filter(|lap| lap.lap_time.is_some()).collect();

        let Some(fastest) = timed.iter().filter_map(|lap| lap.lap_time).min() else {
            return LapTable::default();
        };
        let threshold = fastest.as_secs_f64() * OUTLIER_THRESHOLD;

        timed
            .into_iter()
            .filter(|lap| {
                lap.lap_time
                    .is_some_and(|time| time.as_secs_f64() <= threshold)
            })
            .cloned()
            .collect()
    }

    /// The single fastest timed lap. Ties go to the earlier row.
    pub fn fastest(&self) -> Option<&LapRow> {
        self.rows
            .iter()
            .filter(|lap| lap.lap_time.is_some())
            .min_by_key(|lap| lap.lap_time)
    }

    /// Fastest lap time in the table.
    pub fn fastest_time(&self) -> Option<Duration> {
        self.fastest().and_then(|lap| lap.lap_time)
    }

    /// Distinct competitor codes in first-seen order.
    pub fn competitors(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for lap in &self.rows {
            if !seen.contains(&lap.driver.as_str()) {
                seen.push(lap.driver.as_str());
            }
        }
        seen
    }

    /// Group laps into stints per competitor.
    ///
    /// Competitors appear in first-seen order, stints in ascending order.
    /// Laps without a stint number are skipped. The compound is taken from
    /// the first lap of the stint that reports one.
    pub fn stint_summary(&self) -> Vec<StintSummary> {
        let mut grouped: BTreeMap<(usize, u32), StintSummary> = BTreeMap::new();
        let competitors = self.competitors();

        for lap in &self.rows {
            let Some(stint) = lap.stint else { continue };
            let order = competitors
                .iter()
                .position(|c| *c == lap.driver)
                .unwrap_or(usize::MAX);

            let entry = grouped.entry((order, stint)).or_insert_with(|| StintSummary {
                driver: lap.driver.clone(),
                stint,
                compound: None,
                first_lap: lap.lap_number,
                last_lap: lap.lap_number,
                lap_count: 0,
            });

            entry.first_lap = entry.first_lap.min(lap.lap_number);
            entry.last_lap = entry.last_lap.max(lap.lap_number);
            entry.lap_count += 1;
            if entry.compound.is_none() {
                entry.compound = lap.compound.clone();
            }
        }

        grouped.into_values().collect()
    }
}

impl FromIterator<LapRow> for LapTable {
    fn from_iter<I: IntoIterator<Item = LapRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<LapRow>> for LapTable {
    fn from(rows: Vec<LapRow>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a LapTable {
    type Item = &'a LapRow;
    type IntoIter = std::slice::Iter<'a, LapRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
