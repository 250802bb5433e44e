//! Event metadata with accessor and keyed lookup.
//!
//! Chart code reads event metadata two ways: through typed accessors and by
//! string key (column-style names from the live provider such as
//! `EventName`). Both paths must agree on every supported key.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::EventError;

/// Keys accepted by [`EventMetadata::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    Name,
    Year,
    Date,
}

impl EventKey {
    pub const ALL: [EventKey; 3] = [EventKey::Name, EventKey::Year, EventKey::Date];
}

impl FromStr for EventKey {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" | "EventName" => Ok(Self::Name),
            "year" => Ok(Self::Year),
            "date" | "EventDate" => Ok(Self::Date),
            other => Err(EventError::KeyNotFound {
                key: other.to_string(),
            }),
        }
    }
}

/// A value returned by keyed lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Text(String),
    Year(i32),
    Date(DateTime<Utc>),
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Year(year) => write!(f, "{year}"),
            Self::Date(date) => write!(f, "{}", date.to_rfc3339()),
        }
    }
}

/// Name, year, and date of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    name: String,
    year: i32,
    date: DateTime<Utc>,
}

impl EventMetadata {
    /// Build event metadata. Without a date, the date is January 1st of
    /// `year` at midnight UTC; that placeholder carries no meaning beyond
    /// being present and parseable.
    pub fn new(name: impl Into<String>, year: i32, date: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            year,
            date: date.unwrap_or_else(|| new_year(year)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Keyed lookup. Unsupported keys fail with [`EventError::KeyNotFound`].
    pub fn get(&self, key: &str) -> Result<EventValue, EventError> {
        key.parse::<EventKey>().map(|key| self.value(key))
    }

    /// Value for a typed key.
    pub fn value(&self, key: EventKey) -> EventValue {
        match key {
            EventKey::Name => EventValue::Text(self.name.clone()),
            EventKey::Year => EventValue::Year(self.year),
            EventKey::Date => EventValue::Date(self.date),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        key.parse::<EventKey>().is_ok()
    }
}

fn new_year(year: i32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
