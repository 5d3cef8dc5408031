//! Error types for the repeater directory.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single input record was rejected during ingestion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedReason {
    /// Input row is not a JSON object.
    #[error("record is not a JSON object")]
    NotAnObject,

    /// A required key is absent or null.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A value could not be converted to the field's type.
    #[error("field `{field}` is not a valid {expected}: {found}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A value converted but lies outside the field's domain.
    #[error("field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    /// The id was already assigned to an earlier record.
    #[error("id {0} is already used by an earlier record")]
    DuplicateId(i64),
}

/// Errors raised while building, loading or writing a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// One record failed validation; the whole batch is rejected.
    #[error("malformed record at position {position} (id: {}): {reason}", display_id(.id))]
    MalformedRecord {
        position: usize,
        id: Option<i64>,
        reason: MalformedReason,
    },

    /// Input or snapshot file could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input or snapshot is not the expected JSON shape.
    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot was written by an incompatible version.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshot { found: u32, expected: u32 },
}

impl DatasetError {
    pub(crate) fn malformed(position: usize, id: Option<i64>, reason: MalformedReason) -> Self {
        DatasetError::MalformedRecord {
            position,
            id,
            reason,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_id(id: &Option<i64>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "unknown".to_string(),
    }
}

/// Errors raised for contradictory or incomplete query parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("invalid query parameter `{parameter}`: {reason}")]
    InvalidQuery {
        parameter: &'static str,
        reason: String,
    },
}

impl SearchError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        SearchError::InvalidQuery {
            parameter,
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter
    pub fn parameter(&self) -> &'static str {
        match self {
            SearchError::InvalidQuery { parameter, .. } => parameter,
        }
    }
}

/// Errors raised while loading directory configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_record_message() {
        let err = DatasetError::malformed(3, Some(42), MalformedReason::MissingField("latitude"));
        assert_eq!(
            err.to_string(),
            "malformed record at position 3 (id: 42): missing required field `latitude`"
        );

        let err = DatasetError::malformed(0, None, MalformedReason::NotAnObject);
        assert!(err.to_string().contains("id: unknown"));
    }

    #[test]
    fn test_invalid_query_names_parameter() {
        let err = SearchError::invalid("longitude", "latitude was given without longitude");
        assert_eq!(err.parameter(), "longitude");
        assert!(err.to_string().contains("`longitude`"));
    }
}
