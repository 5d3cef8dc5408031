//! Geospatial repeater directory search
//!
//! Finds amateur radio repeaters near an operator's position, or by
//! callsign prefix, from a static read-only dataset built once by the
//! ingestion tool.

pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod record;
pub mod search;

pub use config::DirectoryConfig;
pub use dataset::{DatasetStats, RepeaterDataset};
pub use error::{ConfigError, DatasetError, MalformedReason, SearchError};
pub use record::{RepeaterRecord, SearchResult};
pub use search::{
    BandFilter, CallsignQuery, Coordinate, LocationQuery, ModeFilter, SearchEngine, SearchOutcome,
    SearchRequest,
};
