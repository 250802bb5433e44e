//! Remote session source interface.
//!
//! The remote data provider is an external collaborator. This module defines
//! the narrow shape it must deliver: loosely-typed tables whose column names
//! follow the provider's (unstable) schema, plus event metadata.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::SourceError;

/// Session kinds the dashboard loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Qualifying,
    Race,
}

impl SessionType {
    /// Token used in cache file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qualifying => "quali",
            Self::Race => "race",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "race" | "r" => Ok(Self::Race),
            "qualifying" | "quali" | "q" => Ok(Self::Qualifying),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

/// One row of a raw table, keyed by column name.
pub type Row = Map<String, Value>;

/// A loosely-typed table as delivered by the remote source.
///
/// Columns are tracked separately from rows so that a column declared by the
/// source but null in every row still counts as present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Frame {
    /// Create a frame with the given column names and no rows.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a frame from rows, declaring every key seen in first-seen order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Append a row. Keys not yet declared become columns.
    pub fn push(&mut self, row: Row) {
        for key in row.keys() {
            if !self.has_column(key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Event metadata as reported by the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub name: String,
    pub date: Option<DateTime<Utc>>,
    /// Scheduled race distance; qualifying sessions usually omit it.
    pub total_laps: Option<u32>,
}

/// A fully loaded session from the remote source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSession {
    pub results: Frame,
    pub laps: Frame,
    /// `None` when the source has no weather feed for the session.
    pub weather: Option<Frame>,
    pub event: RawEvent,
}

/// The remote data source collaborator.
///
/// Implementations perform one blocking fetch per call. Retry, backoff, and
/// timeouts belong to the implementation, not to the cache.
pub trait SessionFetcher {
    /// Fetch the full session for `(year, event_name, session_type)`.
    fn fetch_session(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
    ) -> Result<RawSession, SourceError>;
}

impl<F: SessionFetcher + ?Sized> SessionFetcher for &F {
    fn fetch_session(
        &self,
        year: i32,
        event_name: &str,
        session_type: SessionType,
    ) -> Result<RawSession, SourceError> {
        (**self).fetch_session(year, event_name, session_type)
    }
}
