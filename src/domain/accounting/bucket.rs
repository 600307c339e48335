//! Bucket-stat normalization (`bucket?stats=True`).
//!
//! Field resolution, first present wins:
//!
//! | field          | chain                                              |
//! |----------------|----------------------------------------------------|
//! | owner          | `owner` -> `user`                                  |
//! | zonegroup      | `zonegroup` -> `"0"` (Hammer)                      |
//! | shards         | `num_shards` -> `0`                                |
//! | usage bytes    | `rgw.main.size_actual` -> `size_kb_actual * 1024` -> `0` |
//! | utilized bytes | `rgw.main.size_utilized` -> `0` (pre-Kraken)       |
//! | objects        | `rgw.main.num_objects` -> `0`                      |
//! | quota          | `bucket_quota`, only when present                  |

use crate::domain::accounting::schema::{
    OWNER_CHAIN, Record, as_record, first_present, i64_field, required_string, string_field,
    u64_field,
};
use crate::domain::errors::RecordError;
use serde_json::{Map, Value};

const KIB: u64 = 1024;

/// Quota settings of a bucket or a user. `-1` is the gateway's "unlimited".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub enabled: bool,
    pub max_size: i64,
    pub max_size_bytes: i64,
    pub max_objects: i64,
}

impl Quota {
    /// `max_size_kb` is converted to bytes. Releases without the byte-sized
    /// `max_size` derive it from `max_size_kb`, and the reverse.
    pub fn from_value(value: &Value, kind: &'static str) -> Result<Self, RecordError> {
        let record = as_record(value, kind)?;

        let enabled = match record.get("enabled") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => other.as_i64().map(|n| n != 0).ok_or_else(|| {
                RecordError::InvalidField {
                    record: kind,
                    field: "enabled",
                    reason: format!("expected bool, got {}", other),
                }
            })?,
        };
        let max_size = i64_field(record, kind, "max_size")?;
        let max_size_kb_bytes =
            i64_field(record, kind, "max_size_kb")?.map(|kb| kb.saturating_mul(KIB as i64));

        Ok(Self {
            enabled,
            max_size: max_size.or(max_size_kb_bytes).unwrap_or(-1),
            max_size_bytes: max_size_kb_bytes.or(max_size).unwrap_or(-1),
            max_objects: i64_field(record, kind, "max_objects")?.unwrap_or(-1),
        })
    }
}

/// Canonical bucket record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketStat {
    pub name: String,
    pub owner: String,
    pub zonegroup: String,
    pub shards: u64,
    pub usage_bytes: u64,
    pub utilized_bytes: u64,
    pub objects: u64,
    pub quota: Option<Quota>,
    /// `k=v, k=v` with keys ascending, empty without tags
    pub tags: String,
}

/// Normalizes one entry of the bucket-stats listing.
///
/// Returns `Ok(None)` for non-object entries: Hammer emits junk in this list
/// and those entries are skipped silently.
pub fn normalize_bucket(value: &Value) -> Result<Option<BucketStat>, RecordError> {
    if !value.is_object() {
        return Ok(None);
    }
    let record = as_record(value, "bucket")?;

    let name = required_string(record, "bucket", &["bucket"])?;
    let owner = required_string(record, "bucket", OWNER_CHAIN)?;
    let zonegroup =
        string_field(record, "bucket", &["zonegroup"])?.unwrap_or_else(|| "0".to_string());
    let shards = u64_field(record, "bucket", "num_shards")?.unwrap_or(0);

    let main = match record.get("usage").and_then(|usage| usage.get("rgw.main")) {
        Some(main) => Some(as_record(main, "bucket usage")?),
        None => None,
    };
    let (usage_bytes, utilized_bytes, objects) = match main {
        Some(main) => (
            usage_bytes(main)?,
            u64_field(main, "bucket usage", "size_utilized")?.unwrap_or(0),
            u64_field(main, "bucket usage", "num_objects")?.unwrap_or(0),
        ),
        None => (0, 0, 0),
    };

    let quota = first_present(record, &["bucket_quota"])
        .map(|quota| Quota::from_value(quota, "bucket quota"))
        .transpose()?;

    let tags = match first_present(record, &["tagset"]) {
        Some(Value::Object(tagset)) => format_tags(tagset),
        Some(other) => {
            return Err(RecordError::InvalidField {
                record: "bucket",
                field: "tagset",
                reason: format!("expected object, got {}", other),
            });
        }
        None => String::new(),
    };

    Ok(Some(BucketStat {
        name,
        owner,
        zonegroup,
        shards,
        usage_bytes,
        utilized_bytes,
        objects,
        quota,
        tags,
    }))
}

fn usage_bytes(main: &Record) -> Result<u64, RecordError> {
    if let Some(bytes) = u64_field(main, "bucket usage", "size_actual")? {
        return Ok(bytes);
    }
    // Hammer only reports kilobytes
    Ok(u64_field(main, "bucket usage", "size_kb_actual")?
        .map(|kb| kb.saturating_mul(KIB))
        .unwrap_or(0))
}

/// Renders a tag set as `k=v, k=v`, keys ascending. Non-string values are
/// written as JSON.
pub fn format_tags(tagset: &Map<String, Value>) -> String {
    let mut pairs: Vec<(&String, String)> = tagset
        .iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k, v)
        })
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
