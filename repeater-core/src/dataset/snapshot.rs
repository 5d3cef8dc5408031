//! Dataset snapshot persistence
//!
//! The ingestion tool writes normalised records to a versioned JSON file;
//! the query side loads it read-only and rebuilds the indexes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{RepeaterDataset, parse_export};
use crate::error::DatasetError;
use crate::record::RepeaterRecord;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    built_at: DateTime<Utc>,
    records: &'a [RepeaterRecord],
}

#[derive(Deserialize)]
struct SnapshotFile {
    version: u32,
    built_at: DateTime<Utc>,
    records: Vec<RepeaterRecord>,
}

impl RepeaterDataset {
    /// Serialise to snapshot JSON
    pub fn to_snapshot_json(&self) -> Result<String, DatasetError> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            built_at: self.built_at,
            records: &self.records,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Rebuild a dataset from snapshot JSON
    pub fn from_snapshot_json(json: &str) -> Result<Self, DatasetError> {
        let snapshot: SnapshotFile = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DatasetError::UnsupportedSnapshot {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Self::from_records(snapshot.records, snapshot.built_at)
    }

    /// Load a snapshot file written by [`RepeaterDataset::write_snapshot`]
    pub async fn load_snapshot(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        tracing::info!("Loading repeater snapshot from: {}", path.display());

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DatasetError::io(path, e))?;

        Self::from_snapshot_json(&content)
    }

    /// Build a dataset from an upstream export file
    pub async fn load_export(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        tracing::info!("Ingesting repeater export from: {}", path.display());

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DatasetError::io(path, e))?;

        let records = parse_export(&content)?;
        Self::from_records(records, Utc::now())
    }

    /// Write the snapshot, replacing any previous file in one rename
    pub async fn write_snapshot(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let path = path.as_ref();
        let json = self.to_snapshot_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DatasetError::io(parent, e))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| DatasetError::io(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| DatasetError::io(path, e))?;

        tracing::info!(
            "Wrote repeater snapshot ({} records) to: {}",
            self.len(),
            path.display()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedReason;
    use crate::record::tests::sample_record;

    fn small_dataset() -> RepeaterDataset {
        RepeaterDataset::from_records(
            vec![
                sample_record(1, "KK7CMT", 47.6, -122.3),
                sample_record(2, "K7ABC", 45.5, -122.7),
            ],
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_preserves_order_and_indexes() {
        let dataset = small_dataset();
        let json = dataset.to_snapshot_json().unwrap();
        let loaded = RepeaterDataset::from_snapshot_json(&json).unwrap();

        assert_eq!(loaded.records(), dataset.records());
        assert_eq!(loaded.built_at(), dataset.built_at());
        assert_eq!(loaded.positions_with_callsign_prefix("k7"), vec![1]);
    }

    #[test]
    fn test_snapshot_version_mismatch() {
        let json = r#"{"version": 99, "built_at": "2024-01-01T00:00:00Z", "records": []}"#;
        assert!(matches!(
            RepeaterDataset::from_snapshot_json(json).unwrap_err(),
            DatasetError::UnsupportedSnapshot {
                found: 99,
                expected: SNAPSHOT_VERSION
            }
        ));
    }

    #[test]
    fn test_snapshot_rechecks_duplicate_ids() {
        let dataset = small_dataset();
        let mut value: serde_json::Value =
            serde_json::from_str(&dataset.to_snapshot_json().unwrap()).unwrap();
        value["records"][1]["id"] = serde_json::json!(1);

        let err = RepeaterDataset::from_snapshot_json(&value.to_string()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MalformedRecord {
                reason: MalformedReason::DuplicateId(1),
                ..
            }
        ));
    }

    #[test]
    fn test_hand_edited_snapshot_is_normalized() {
        let mut value: serde_json::Value =
            serde_json::from_str(&small_dataset().to_snapshot_json().unwrap()).unwrap();
        value["records"][0]["callsign"] = serde_json::json!("kk7cmt");

        let loaded = RepeaterDataset::from_snapshot_json(&value.to_string()).unwrap();
        assert_eq!(loaded.positions_with_callsign_prefix("kk7"), vec![0]);
    }

    #[tokio::test]
    async fn test_write_and_load_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("repeaters.snapshot.json");

        small_dataset().write_snapshot(&path).await.unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = RepeaterDataset::load_snapshot(&path).await.unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = RepeaterDataset::load_snapshot("does/not/exist.json")
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
