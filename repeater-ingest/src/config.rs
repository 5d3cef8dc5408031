use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Raw directory export (JSON array of rows)
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Log files older than this are removed at startup
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("data/repeaters.json")
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/repeaters.snapshot.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_max_age_days() -> u64 {
    3
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            snapshot_path: default_snapshot_path(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            max_age_days: default_max_age_days(),
        }
    }
}

impl IngestConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: IngestConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Config named on the command line, else `ingest.toml` if present, else defaults
    pub fn resolve(arg: Option<&str>) -> anyhow::Result<Self> {
        match arg {
            Some(path) => Self::from_file(path),
            None if Path::new("ingest.toml").exists() => Self::from_file("ingest.toml"),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: IngestConfig = toml::from_str("").unwrap();
        assert_eq!(config.input_path, PathBuf::from("data/repeaters.json"));
        assert_eq!(config.snapshot_path, PathBuf::from("data/repeaters.snapshot.json"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_age_days, 3);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.toml");
        std::fs::write(
            &path,
            "input_path = \"export.json\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = IngestConfig::resolve(path.to_str()).unwrap();
        assert_eq!(config.input_path, PathBuf::from("export.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(IngestConfig::from_file(&path).is_err());
    }
}
