//! Error types for paddock operations

use std::path::PathBuf;
use thiserror::Error;

use crate::SessionType;

/// Failures of the remote session source.
///
/// Every variant means "data unavailable": the load cannot produce a record
/// and the caller should surface a message instead of rendering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Session data unavailable for {year} {event} ({session_type}): {reason}")]
    Unavailable {
        year: i32,
        event: String,
        session_type: SessionType,
        reason: String,
    },

    #[error("No {session_type} session found for {year} {event}")]
    SessionNotFound {
        year: i32,
        event: String,
        session_type: SessionType,
    },
}

/// Raw table schema errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Required column missing for {concept}: tried {candidates:?}, available {available:?}")]
    MissingColumn {
        concept: String,
        candidates: Vec<String>,
        available: Vec<String>,
    },
}

/// Cache persistence errors.
///
/// These never escape a session load; they are recovered as a cache miss
/// or logged when persisting a freshly fetched record fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Failed to serialize record for {path}: {reason}")]
    Serialization { path: PathBuf, reason: String },

    #[error("Corrupt cache entry {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Event metadata lookup errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("Event key not found: {key}")]
    KeyNotFound { key: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all paddock errors.
#[derive(Debug, Clone, Error)]
pub enum PaddockError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl PaddockError {
    /// True when the remote source could not supply the session at all.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Self::Source(_))
    }

    /// True when a required results column had no usable candidate.
    pub fn is_missing_column(&self) -> bool {
        matches!(self, Self::Schema(SchemaError::MissingColumn { .. }))
    }
}

/// Result type alias for paddock operations.
pub type PaddockResult<T> = Result<T, PaddockError>;

// =============================================================================
// TESTS
// =============================================================================
