//! Repeater record and search result types

use serde::{Deserialize, Serialize};

use crate::search::geo::Coordinate;

/// One physical repeater station, immutable once ingested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeaterRecord {
    /// Ingestion-assigned id, unique within a dataset
    pub id: i64,
    /// Upper-cased callsign, e.g. "KK7CMT"
    pub callsign: String,
    #[serde(flatten)]
    pub location: Coordinate,
    pub city: String,
    /// Free-text group label
    pub category: String,
    pub internet_node: String,
    /// Upper-cased mode label, e.g. "FM", "DMR", "D-STAR"
    pub mode: String,
    /// CTCSS tone required on the uplink
    pub encode: Option<String>,
    /// CTCSS tone sent on the downlink
    pub decode: Option<String>,
    /// Output frequency in Hz
    pub frequency_hz: u64,
    /// Signed input offset in Hz (input = frequency + offset)
    pub offset_hz: i64,
    pub description: String,
    pub power: String,
    pub operational: bool,
    /// Access restriction, e.g. membership requirements
    pub restriction: String,
}

impl RepeaterRecord {
    /// Output frequency in MHz
    pub fn frequency_mhz(&self) -> f64 {
        self.frequency_hz as f64 / 1_000_000.0
    }

    /// Input (uplink) frequency in Hz, saturating on absurd offsets
    pub fn input_frequency_hz(&self) -> i64 {
        i64::try_from(self.frequency_hz)
            .unwrap_or(i64::MAX)
            .saturating_add(self.offset_hz)
    }

    /// Offset in MHz
    pub fn offset_mhz(&self) -> f64 {
        self.offset_hz as f64 / 1_000_000.0
    }
}

/// A record annotated with its distance from the query origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub record: RepeaterRecord,
    /// Kilometres from the origin; `None` when the query had no origin
    pub distance_km: Option<f64>,
}

impl SearchResult {
    pub fn new(record: RepeaterRecord, distance_km: Option<f64>) -> Self {
        Self {
            record,
            distance_km,
        }
    }
}
