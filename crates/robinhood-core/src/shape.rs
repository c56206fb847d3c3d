//! Response shaping.
//!
//! Endpoint functions take an optional `info` field name and return either
//! the full response or just that field, for a single record or for every
//! record of a list.

use serde_json::Value;
use tracing::warn;

/// Pull `field` out of `data`.
///
/// - `None` data stays `None`.
/// - No field requested: `data` is returned unchanged.
/// - A list yields the field of every record, or an empty list when the
///   first record has no such key.
/// - A single record yields its field, or `None` when missing.
pub fn extract(data: Option<Value>, field: Option<&str>) -> Option<Value> {
    let data = data?;
    let Some(field) = field else {
        return Some(data);
    };

    match data {
        Value::Array(records) => {
            let has_field = records
                .first()
                .and_then(Value::as_object)
                .is_some_and(|first| first.contains_key(field));

            if records.is_empty() {
                return Some(Value::Array(Vec::new()));
            }
            if !has_field {
                warn!(field, "The keyword is not a key in the dictionary");
                return Some(Value::Array(Vec::new()));
            }

            Some(Value::Array(
                records
                    .into_iter()
                    .map(|mut record| record.get_mut(field).map(Value::take).unwrap_or(Value::Null))
                    .collect(),
            ))
        }
        Value::Object(mut record) => {
            let value = record.remove(field);
            if value.is_none() {
                warn!(field, "The keyword is not a key in the dictionary");
            }
            value
        }
        _ => {
            warn!(field, "Cannot extract a field from a scalar response");
            None
        }
    }
}
