use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::search::DEFAULT_MAX_DISTANCE_KM;

/// `[repeaters]` settings for a host application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Snapshot written by the ingestion tool
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Radius for location searches that give none
    #[serde(default = "default_max_distance_km")]
    pub default_max_distance_km: f64,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/repeaters.snapshot.json")
}

fn default_max_distance_km() -> f64 {
    DEFAULT_MAX_DISTANCE_KM
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            default_max_distance_km: default_max_distance_km(),
        }
    }
}

impl DirectoryConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DirectoryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_max_distance_km.is_finite() || self.default_max_distance_km <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "default_max_distance_km",
                reason: format!("{} must be positive", self.default_max_distance_km),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DirectoryConfig::from_toml_str("").unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("data/repeaters.snapshot.json"));
        assert_eq!(config.default_max_distance_km, 80.0);
    }

    #[test]
    fn test_overrides() {
        let config = DirectoryConfig::from_toml_str(
            r#"
snapshot_path = "/srv/repeaters.json"
default_max_distance_km = 40.5
"#,
        )
        .unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("/srv/repeaters.json"));
        assert_eq!(config.default_max_distance_km, 40.5);
    }

    #[test]
    fn test_rejects_bad_radius() {
        let err = DirectoryConfig::from_toml_str("default_max_distance_km = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "default_max_distance_km",
                ..
            }
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repeaters.toml");
        std::fs::write(&path, "default_max_distance_km = 25.0\n").unwrap();
        assert_eq!(DirectoryConfig::from_file(&path).unwrap().default_max_distance_km, 25.0);

        assert!(matches!(
            DirectoryConfig::from_file(dir.path().join("nope.toml")).unwrap_err(),
            ConfigError::Io { .. }
        ));
    }
}
