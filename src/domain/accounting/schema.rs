//! Field access across gateway releases.
//!
//! The admin API's JSON shape drifted between releases (`owner` vs `user`,
//! `size_actual` vs `size_kb_actual`, optional `zonegroup`...). Every logical
//! field is read through a fallback chain: the first key present wins, and
//! an explicit JSON `null` counts as absent.

use crate::domain::errors::RecordError;
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// Owner of a usage entry, bucket bin or summary. `user` is the Luminous name.
pub const OWNER_CHAIN: &[&str] = &["owner", "user"];

pub fn first_present<'a>(record: &'a Record, chain: &[&str]) -> Option<&'a Value> {
    chain
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

pub fn as_record<'a>(value: &'a Value, record: &'static str) -> Result<&'a Record, RecordError> {
    value.as_object().ok_or_else(|| RecordError::InvalidField {
        record,
        field: "<root>",
        reason: format!("expected a JSON object, got {}", type_name(value)),
    })
}

pub fn string_field(
    record: &Record,
    kind: &'static str,
    chain: &[&'static str],
) -> Result<Option<String>, RecordError> {
    let Some(value) = first_present(record, chain) else {
        return Ok(None);
    };
    match value {
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(invalid(kind, chain, "string", other)),
    }
}

pub fn required_string(
    record: &Record,
    kind: &'static str,
    chain: &[&'static str],
) -> Result<String, RecordError> {
    string_field(record, kind, chain)?.ok_or(RecordError::MissingField {
        record: kind,
        field: chain.first().copied().unwrap_or("<unknown>"),
    })
}

pub fn u64_field(
    record: &Record,
    kind: &'static str,
    key: &'static str,
) -> Result<Option<u64>, RecordError> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid(kind, &[key], "unsigned integer", value)),
    }
}

pub fn i64_field(
    record: &Record,
    kind: &'static str,
    key: &'static str,
) -> Result<Option<i64>, RecordError> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid(kind, &[key], "integer", value)),
    }
}

pub fn array_field<'a>(
    record: &'a Record,
    kind: &'static str,
    key: &'static str,
) -> Result<&'a [Value], RecordError> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(invalid(kind, &[key], "array", other)),
    }
}

fn invalid(kind: &'static str, chain: &[&'static str], expected: &str, got: &Value) -> RecordError {
    RecordError::InvalidField {
        record: kind,
        field: chain.first().copied().unwrap_or("<unknown>"),
        reason: format!("expected {}, got {}", expected, type_name(got)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_owner_chain_prefers_owner() {
        let r = record(json!({"user": "luminous", "owner": "modern"}));
        assert_eq!(
            string_field(&r, "entry", OWNER_CHAIN).unwrap().as_deref(),
            Some("modern")
        );
    }

    #[test]
    fn test_owner_chain_falls_back_to_user() {
        let r = record(json!({"user": "luminous"}));
        assert_eq!(
            string_field(&r, "entry", OWNER_CHAIN).unwrap().as_deref(),
            Some("luminous")
        );
    }

    #[test]
    fn test_null_is_treated_as_absent() {
        let r = record(json!({"owner": null, "user": "fallback"}));
        assert_eq!(
            string_field(&r, "entry", OWNER_CHAIN).unwrap().as_deref(),
            Some("fallback")
        );
        assert_eq!(u64_field(&r, "entry", "owner").unwrap(), None);
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let r = record(json!({"num_objects": "many"}));
        let err = u64_field(&r, "bucket", "num_objects").unwrap_err();
        assert!(matches!(
            err,
            RecordError::InvalidField {
                field: "num_objects",
                ..
            }
        ));
    }

    #[test]
    fn test_required_string_reports_first_key() {
        let r = record(json!({}));
        assert_eq!(
            required_string(&r, "usage entry", OWNER_CHAIN).unwrap_err(),
            RecordError::MissingField {
                record: "usage entry",
                field: "owner"
            }
        );
    }

    #[test]
    fn test_missing_array_is_empty() {
        let r = record(json!({}));
        assert!(array_field(&r, "entry", "buckets").unwrap().is_empty());
    }
}
