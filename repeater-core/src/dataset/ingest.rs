//! Ingestion of the upstream repeater export
//!
//! The export is a JSON array of objects with the keys `id, callsign,
//! latitude, longitude, city, group, internet_node, mode, encode, decode,
//! frequency, offset, description, power, operational, restriction`.
//! Ingestion is all-or-nothing: the first bad record aborts the batch.

use serde_json::{Map, Value};

use crate::error::{DatasetError, MalformedReason};
use crate::record::RepeaterRecord;
use crate::search::geo::Coordinate;

/// Parse and normalise an upstream JSON export.
pub fn parse_export(json: &str) -> Result<Vec<RepeaterRecord>, DatasetError> {
    let rows: Vec<Value> = serde_json::from_str(json)?;
    normalize_rows(&rows)
}

/// Normalise already-parsed input rows, in order.
pub fn normalize_rows(rows: &[Value]) -> Result<Vec<RepeaterRecord>, DatasetError> {
    rows.iter()
        .enumerate()
        .map(|(position, row)| normalize_row(position, row))
        .collect()
}

fn normalize_row(position: usize, row: &Value) -> Result<RepeaterRecord, DatasetError> {
    let map = row
        .as_object()
        .ok_or_else(|| DatasetError::malformed(position, None, MalformedReason::NotAnObject))?;

    // id first, so later errors can name the record
    let id = RowReader {
        position,
        id: None,
        map,
    }
    .required_i64("id")?;
    let row = RowReader {
        position,
        id: Some(id),
        map,
    };

    let latitude = row.required_f64("latitude")?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(row.error(MalformedReason::OutOfRange {
            field: "latitude",
            value: latitude.to_string(),
        }));
    }
    let longitude = row.required_f64("longitude")?;
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(row.error(MalformedReason::OutOfRange {
            field: "longitude",
            value: longitude.to_string(),
        }));
    }

    let callsign = row.required_string("callsign")?.to_uppercase();
    if callsign.is_empty() {
        return Err(row.error(MalformedReason::OutOfRange {
            field: "callsign",
            value: "\"\"".to_string(),
        }));
    }

    let frequency = row.required_i64("frequency")?;
    let frequency_hz = u64::try_from(frequency)
        .ok()
        .filter(|hz| *hz > 0)
        .ok_or_else(|| {
            row.error(MalformedReason::OutOfRange {
                field: "frequency",
                value: frequency.to_string(),
            })
        })?;

    // Uplink must land on a real, positive frequency
    let offset_hz = row.required_i64("offset")?;
    let input_ok = i64::try_from(frequency_hz)
        .ok()
        .and_then(|hz| hz.checked_add(offset_hz))
        .is_some_and(|hz| hz > 0);
    if !input_ok {
        return Err(row.error(MalformedReason::OutOfRange {
            field: "offset",
            value: offset_hz.to_string(),
        }));
    }

    Ok(RepeaterRecord {
        id,
        callsign,
        location: Coordinate {
            latitude,
            longitude,
        },
        city: row.optional_string("city"),
        category: row.optional_string("group"),
        internet_node: row.optional_string("internet_node"),
        mode: row.required_string("mode")?.to_uppercase(),
        encode: non_empty(row.optional_string("encode")),
        decode: non_empty(row.optional_string("decode")),
        frequency_hz,
        offset_hz,
        description: row.optional_string("description"),
        power: row.optional_string("power"),
        operational: row.required_bool("operational")?,
        restriction: row.optional_string("restriction"),
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Typed field access on one input row, tagging errors with its position and id
struct RowReader<'a> {
    position: usize,
    id: Option<i64>,
    map: &'a Map<String, Value>,
}

impl RowReader<'_> {
    fn error(&self, reason: MalformedReason) -> DatasetError {
        DatasetError::malformed(self.position, self.id, reason)
    }

    fn invalid(&self, field: &'static str, expected: &'static str, found: &Value) -> DatasetError {
        self.error(MalformedReason::InvalidType {
            field,
            expected,
            found: found.to_string(),
        })
    }

    /// Present and non-null value
    fn required(&self, field: &'static str) -> Result<&Value, DatasetError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Err(self.error(MalformedReason::MissingField(field))),
            Some(value) => Ok(value),
        }
    }

    fn required_i64(&self, field: &'static str) -> Result<i64, DatasetError> {
        let value = self.required(field)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                // Whole-valued floats such as 146520000.0
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(field, "integer", value))
    }

    fn required_f64(&self, field: &'static str) -> Result<f64, DatasetError> {
        let value = self.required(field)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|f| f.is_finite())
            .ok_or_else(|| self.invalid(field, "number", value))
    }

    fn required_bool(&self, field: &'static str) -> Result<bool, DatasetError> {
        let value = self.required(field)?;
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(field, "boolean", value))
    }

    fn required_string(&self, field: &'static str) -> Result<String, DatasetError> {
        match self.required(field)? {
            Value::String(s) => Ok(s.trim().to_string()),
            other => Err(self.invalid(field, "string", other)),
        }
    }

    /// Trimmed text; missing or null becomes empty, scalars are stringified
    fn optional_string(&self, field: &str) -> String {
        match self.map.get(field) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }
}
