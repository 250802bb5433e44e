//! Paddock Core - Session Data Types
//!
//! Flat race records, the raw-source interface they are normalized from,
//! and the session views chart code consumes. No I/O lives here; the
//! on-disk cache is in `paddock-storage`.
//!
//! # Example
//!
//! ```ignore
//! let live = LiveSession::from_raw(fetcher.fetch_session(2024, "Monaco Grand Prix", SessionType::Race)?, 2024)?;
//! let quick = live.laps().filter_by_competitor("LEC").filter_representative();
//! println!("{} representative laps at {}", quick.len(), live.event().name());
//! ```

pub mod columns;
pub mod config;
pub mod error;
pub mod event;
pub mod laps;
pub mod normalize;
pub mod record;
pub mod results;
pub mod session;
pub mod source;

pub use columns::ColumnFallback;
pub use config::{CacheConfig, DEFAULT_CACHE_DIR, DEFAULT_MAX_AGE_DAYS};
pub use error::{
    CacheError, ConfigError, EventError, PaddockError, PaddockResult, SchemaError, SourceError,
};
pub use event::{EventKey, EventMetadata, EventValue};
pub use laps::{LapTable, StintSummary, OUTLIER_THRESHOLD};
pub use normalize::normalize_session;
pub use record::{EventInfo, LapRow, RaceRecord, ResultRow, WeatherSample};
pub use results::{PositionChange, ResultTable};
pub use session::{CachedSessionView, LiveSession, SessionSource, SessionView};
pub use source::{Frame, RawEvent, RawSession, Row, SessionFetcher, SessionType};
