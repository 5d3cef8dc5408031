//! Repeater dataset - immutable, indexed repeater records
//!
//! Built once from an upstream export (or loaded from a snapshot written by
//! the ingestion tool) and never mutated afterwards.
//!
//! ## Access paths
//! - Inclusive latitude/longitude range, via an index sorted by (lat, lon)
//! - Case-insensitive literal callsign prefix, via an index sorted by callsign
//!
//! Both return record positions in ingestion order.

mod ingest;
pub use ingest::{normalize_rows, parse_export};

mod snapshot;
pub use snapshot::SNAPSHOT_VERSION;

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{DatasetError, MalformedReason};
use crate::record::RepeaterRecord;
use crate::search::geo::BoundingBox;

/// Immutable repeater dataset with location and callsign indexes
#[derive(Debug, Clone)]
pub struct RepeaterDataset {
    /// Records in ingestion order
    records: Vec<RepeaterRecord>,

    /// Positions sorted by (latitude, longitude)
    by_location: Vec<usize>,

    /// Positions sorted by callsign
    by_callsign: Vec<usize>,

    /// When the dataset was built from the upstream export
    built_at: DateTime<Utc>,
}

impl RepeaterDataset {
    /// Build a dataset from an upstream JSON export
    pub fn from_export(json: &str) -> Result<Self, DatasetError> {
        let records = parse_export(json)?;
        Self::from_records(records, Utc::now())
    }

    /// Build a dataset from records, checking id uniqueness.
    ///
    /// Callsign and mode are trimmed and upper-cased whatever produced the
    /// records, so prefix lookup stays case-insensitive.
    pub fn from_records(
        records: Vec<RepeaterRecord>,
        built_at: DateTime<Utc>,
    ) -> Result<Self, DatasetError> {
        let records: Vec<RepeaterRecord> = records
            .into_iter()
            .map(|mut record| {
                record.callsign = record.callsign.trim().to_uppercase();
                record.mode = record.mode.trim().to_uppercase();
                record
            })
            .collect();

        let mut seen = HashSet::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if !seen.insert(record.id) {
                return Err(DatasetError::malformed(
                    position,
                    Some(record.id),
                    MalformedReason::DuplicateId(record.id),
                ));
            }
        }

        // Stable sorts, so equal keys keep ingestion order
        let mut by_location: Vec<usize> = (0..records.len()).collect();
        by_location.sort_by(|&a, &b| {
            let (a, b) = (&records[a].location, &records[b].location);
            a.latitude
                .total_cmp(&b.latitude)
                .then(a.longitude.total_cmp(&b.longitude))
        });

        let mut by_callsign: Vec<usize> = (0..records.len()).collect();
        by_callsign.sort_by(|&a, &b| records[a].callsign.cmp(&records[b].callsign));

        let dataset = Self {
            records,
            by_location,
            by_callsign,
            built_at,
        };

        tracing::info!("Repeater dataset ready: {}", dataset.stats());

        Ok(dataset)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in ingestion order
    pub fn records(&self) -> &[RepeaterRecord] {
        &self.records
    }

    /// Record at an ingestion position
    pub fn get(&self, position: usize) -> Option<&RepeaterRecord> {
        self.records.get(position)
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Positions of records inside an inclusive box, in ingestion order
    pub fn positions_in_box(&self, bbox: &BoundingBox) -> Vec<usize> {
        let start = self
            .by_location
            .partition_point(|&i| self.records[i].location.latitude < bbox.south);

        let mut positions: Vec<usize> = self.by_location[start..]
            .iter()
            .copied()
            .take_while(|&i| self.records[i].location.latitude <= bbox.north)
            .filter(|&i| bbox.contains(&self.records[i].location))
            .collect();

        positions.sort_unstable();
        positions
    }

    /// Positions of records whose callsign starts with `prefix`, in ingestion order.
    ///
    /// Case-insensitive, literal (no wildcards).
    pub fn positions_with_callsign_prefix(&self, prefix: &str) -> Vec<usize> {
        let prefix = prefix.trim().to_uppercase();

        let start = self
            .by_callsign
            .partition_point(|&i| self.records[i].callsign.as_str() < prefix.as_str());

        let mut positions: Vec<usize> = self.by_callsign[start..]
            .iter()
            .copied()
            .take_while(|&i| self.records[i].callsign.starts_with(&prefix))
            .collect();

        positions.sort_unstable();
        positions
    }

    /// Summary statistics
    pub fn stats(&self) -> DatasetStats {
        let mut modes = BTreeMap::new();
        for record in &self.records {
            *modes.entry(record.mode.clone()).or_insert(0) += 1;
        }

        DatasetStats {
            total_records: self.records.len(),
            operational_records: self.records.iter().filter(|r| r.operational).count(),
            modes,
        }
    }
}

/// Dataset statistics
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub total_records: usize,
    pub operational_records: usize,
    /// Record count per mode label
    pub modes: BTreeMap<String, usize>,
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repeaters: {}, Operational: {}, Modes: {}",
            self.total_records,
            self.operational_records,
            self.modes.len()
        )
    }
}
