//! Column-name fallback tables for the raw source schema.
//!
//! The upstream provider renames columns between releases. Each concept the
//! normalizer needs is described by an ordered candidate list; the first
//! candidate present in the frame wins. New spellings are appended to a list
//! without touching control flow.

use crate::{Frame, SchemaError};

/// An ordered list of column names that may carry one concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFallback {
    /// Human-readable name used in diagnostics.
    pub concept: &'static str,
    /// Candidate column names, most preferred first.
    pub candidates: &'static [&'static str],
}

impl ColumnFallback {
    pub const fn new(concept: &'static str, candidates: &'static [&'static str]) -> Self {
        Self {
            concept,
            candidates,
        }
    }

    /// First candidate the frame declares, if any.
    pub fn resolve(&self, frame: &Frame) -> Option<&'static str> {
        self.candidates
            .iter()
            .copied()
            .find(|candidate| frame.has_column(candidate))
    }

    /// Like [`resolve`](Self::resolve), but a miss is a schema error naming
    /// the candidates and the columns actually present.
    pub fn require(&self, frame: &Frame) -> Result<&'static str, SchemaError> {
        self.resolve(frame).ok_or_else(|| SchemaError::MissingColumn {
            concept: self.concept.to_string(),
            candidates: self.candidates.iter().map(|c| c.to_string()).collect(),
            available: frame.columns().to_vec(),
        })
    }
}

// ============================================================================
// RESULTS TABLE
// ============================================================================

pub const FINISH_POSITION: ColumnFallback = ColumnFallback::new(
    "finishing position",
    &["Position", "ClassifiedPosition", "FinishPosition", "FinalPosition"],
);

pub const GRID_POSITION: ColumnFallback =
    ColumnFallback::new("grid position", &["GridPosition", "StartPosition", "Grid"]);

pub const RESULT_DRIVER: ColumnFallback =
    ColumnFallback::new("competitor code", &["Abbreviation", "Driver"]);

pub const TEAM_NAME: ColumnFallback = ColumnFallback::new("team", &["TeamName", "Team"]);

pub const DRIVER_NUMBER: ColumnFallback =
    ColumnFallback::new("competitor number", &["DriverNumber", "CarNumber"]);

// ============================================================================
// LAPS AND WEATHER TABLES
// ============================================================================

/// Lap table column names. The lap schema has been stable upstream, so these
/// are fixed rather than fallback lists.
pub mod laps {
    pub const DRIVER: &str = "Driver";
    pub const DRIVER_NUMBER: &str = "DriverNumber";
    pub const LAP_NUMBER: &str = "LapNumber";
    pub const LAP_TIME: &str = "LapTime";
    pub const POSITION: &str = "Position";
    pub const COMPOUND: &str = "Compound";
    pub const TYRE_LIFE: &str = "TyreLife";
    pub const STINT: &str = "Stint";
}

/// Weather table column names.
pub mod weather {
    pub const TIME: &str = "Time";
    pub const AIR_TEMP: &str = "AirTemp";
    pub const TRACK_TEMP: &str = "TrackTemp";
    pub const WIND_SPEED: &str = "WindSpeed";
    pub const RAINFALL: &str = "Rainfall";
}
