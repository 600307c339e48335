//! Usage log records returned by `usage?show-summary=True`.

use crate::domain::accounting::eligibility::BucketLifecycle;
use crate::domain::accounting::schema::{
    OWNER_CHAIN, array_field, as_record, required_string, string_field,
};
use crate::domain::errors::RecordError;
use serde::Deserialize;
use serde_json::Value;
use std::ops::AddAssign;
use tracing::warn;

/// Label used for usage recorded against no bucket (service-level calls).
pub const BUCKET_ROOT: &str = "bucket_root";

/// The four usage counters the gateway tracks per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UsageCounters {
    #[serde(default)]
    pub ops: u64,
    #[serde(default)]
    pub successful_ops: u64,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub bytes_received: u64,
}

impl UsageCounters {
    /// Adds `other` field by field.
    ///
    /// Associative and commutative with `UsageCounters::default()` as
    /// identity, so the order in which bins are folded never matters.
    /// Saturates instead of wrapping.
    pub fn accumulate(&mut self, other: &UsageCounters) {
        self.ops = self.ops.saturating_add(other.ops);
        self.successful_ops = self.successful_ops.saturating_add(other.successful_ops);
        self.bytes_sent = self.bytes_sent.saturating_add(other.bytes_sent);
        self.bytes_received = self.bytes_received.saturating_add(other.bytes_received);
    }
}

impl AddAssign<&UsageCounters> for UsageCounters {
    fn add_assign(&mut self, rhs: &UsageCounters) {
        self.accumulate(rhs);
    }
}

impl<'a> std::iter::Sum<&'a UsageCounters> for UsageCounters {
    fn sum<I: Iterator<Item = &'a UsageCounters>>(iter: I) -> Self {
        iter.fold(UsageCounters::default(), |mut acc, c| {
            acc += c;
            acc
        })
    }
}

/// Counters for one operation category (`get_obj`, `put_obj`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryCounters {
    pub category: String,
    #[serde(flatten)]
    pub counters: UsageCounters,
}

impl CategoryCounters {
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        CategoryCounters::deserialize(value).map_err(|e| RecordError::InvalidField {
            record: "usage category",
            field: "categories",
            reason: e.to_string(),
        })
    }
}

/// One bucket's share of a usage entry ("bin").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketUsageBin {
    /// Bucket name, [`BUCKET_ROOT`] when the gateway reported none or an empty one
    pub bucket: String,
    /// Owner recorded on the bin itself, if any
    pub owner: Option<String>,
    pub categories: Vec<CategoryCounters>,
}

impl BucketUsageBin {
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let record = as_record(value, "usage bucket")?;
        let bucket = string_field(record, "usage bucket", &["bucket"])?.unwrap_or_default();
        let owner = string_field(record, "usage bucket", OWNER_CHAIN)?;
        let categories = array_field(record, "usage bucket", "categories")?
            .iter()
            .map(CategoryCounters::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            bucket: if bucket.is_empty() {
                BUCKET_ROOT.to_string()
            } else {
                bucket
            },
            owner,
            categories,
        })
    }

    pub fn lifecycle(&self) -> BucketLifecycle {
        BucketLifecycle::from_categories(&self.categories)
    }

    /// Sum of all category counters in this bin
    pub fn totals(&self) -> UsageCounters {
        self.categories.iter().map(|c| &c.counters).sum()
    }
}

/// Usage of one owner. Pagination can split an owner over several entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    pub owner: String,
    pub buckets: Vec<BucketUsageBin>,
}

impl UsageEntry {
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let record = as_record(value, "usage entry")?;
        let owner = required_string(record, "usage entry", OWNER_CHAIN)?;
        let buckets = array_field(record, "usage entry", "buckets")?
            .iter()
            .filter_map(|bin| match BucketUsageBin::from_value(bin) {
                Ok(bin) => Some(bin),
                Err(e) => {
                    warn!("Skipping usage bin of owner {}: {}", owner, e);
                    None
                }
            })
            .collect();

        Ok(Self { owner, buckets })
    }
}

/// Per-owner summary block of the usage response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUsageSummary {
    pub user: String,
    pub categories: Vec<CategoryCounters>,
    pub total: Option<UsageCounters>,
}

impl UserUsageSummary {
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let record = as_record(value, "usage summary")?;
        let user = required_string(record, "usage summary", OWNER_CHAIN)?;
        let categories = array_field(record, "usage summary", "categories")?
            .iter()
            .map(CategoryCounters::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        let total = match record.get("total") {
            None | Some(Value::Null) => None,
            Some(total) => Some(UsageCounters::deserialize(total).map_err(|e| {
                RecordError::InvalidField {
                    record: "usage summary",
                    field: "total",
                    reason: e.to_string(),
                }
            })?),
        };

        Ok(Self {
            user,
            categories,
            total,
        })
    }
}

/// Parsed `usage` response. Malformed records are logged and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageReport {
    pub entries: Vec<UsageEntry>,
    pub summary: Vec<UserUsageSummary>,
}

impl UsageReport {
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let record = as_record(value, "usage response")?;

        let entries = array_field(record, "usage response", "entries")?
            .iter()
            .filter_map(|entry| match UsageEntry::from_value(entry) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping usage entry: {}", e);
                    None
                }
            })
            .collect();

        let summary = array_field(record, "usage response", "summary")?
            .iter()
            .filter_map(|summary| match UserUsageSummary::from_value(summary) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("Skipping usage summary: {}", e);
                    None
                }
            })
            .collect();

        Ok(Self { entries, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn counters(ops: u64, successful_ops: u64, bytes_sent: u64, bytes_received: u64) -> UsageCounters {
        UsageCounters {
            ops,
            successful_ops,
            bytes_sent,
            bytes_received,
        }
    }

    #[test]
    fn test_accumulate_is_fieldwise_sum() {
        let mut acc = counters(10, 9, 100, 7);
        acc.accumulate(&counters(5, 5, 20, 3));
        assert_eq!(acc, counters(15, 14, 120, 10));
    }

    #[test]
    fn test_accumulate_is_order_independent() {
        let bins = [counters(1, 1, 10, 0), counters(2, 0, 0, 5), counters(4, 4, 1, 1)];

        let forward: UsageCounters = bins.iter().sum();
        let backward: UsageCounters = bins.iter().rev().sum();
        let mut grouped = counters(0, 0, 0, 0);
        let mut tail = bins[1];
        tail.accumulate(&bins[2]);
        grouped.accumulate(&bins[0]);
        grouped.accumulate(&tail);

        assert_eq!(forward, backward);
        assert_eq!(forward, grouped);
        assert_eq!(forward, counters(7, 5, 11, 6));
    }

    #[test]
    fn test_accumulate_saturates() {
        let mut acc = counters(u64::MAX, 0, 0, 0);
        acc.accumulate(&counters(1, 0, 0, 0));
        assert_eq!(acc.ops, u64::MAX);
    }

    #[test]
    fn test_empty_bucket_name_becomes_root() {
        let bin = BucketUsageBin::from_value(&json!({
            "bucket": "",
            "owner": "alice",
            "categories": [{"category": "list_buckets", "ops": 3, "successful_ops": 3,
                            "bytes_sent": 300, "bytes_received": 0}]
        }))
        .unwrap();
        assert_eq!(bin.bucket, BUCKET_ROOT);
        assert_eq!(bin.owner.as_deref(), Some("alice"));
        assert_eq!(bin.totals(), counters(3, 3, 300, 0));
    }

    #[test]
    fn test_null_or_missing_bucket_name_becomes_root() {
        let null_name = BucketUsageBin::from_value(&json!({
            "bucket": null,
            "owner": "alice",
            "categories": [{"category": "list_buckets", "ops": 3, "successful_ops": 3}]
        }))
        .unwrap();
        assert_eq!(null_name.bucket, BUCKET_ROOT);
        assert_eq!(null_name.totals(), counters(3, 3, 0, 0));

        let missing_name = BucketUsageBin::from_value(&json!({"categories": []})).unwrap();
        assert_eq!(missing_name.bucket, BUCKET_ROOT);
    }

    #[test]
    fn test_luminous_entry_uses_user_field() {
        let entry = UsageEntry::from_value(&json!({
            "user": "bob",
            "buckets": [{"bucket": "logs", "categories": []}]
        }))
        .unwrap();
        assert_eq!(entry.owner, "bob");
        assert_eq!(entry.buckets.len(), 1);
        assert_eq!(entry.buckets[0].owner, None);
    }

    #[test]
    fn test_malformed_bin_is_dropped_not_fatal() {
        let entry = UsageEntry::from_value(&json!({
            "owner": "carol",
            "buckets": [
                {"bucket": 7, "categories": []},
                {"bucket": "ok", "categories": []}
            ]
        }))
        .unwrap();
        assert_eq!(entry.buckets.len(), 1);
        assert_eq!(entry.buckets[0].bucket, "ok");
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let c = CategoryCounters::from_value(&json!({"category": "get_obj", "ops": 4})).unwrap();
        assert_eq!(c.counters, counters(4, 0, 0, 0));
    }

    #[test]
    fn test_summary_total_is_optional() {
        let summary = UserUsageSummary::from_value(&json!({
            "user": "dave",
            "categories": [{"category": "put_obj", "ops": 2, "successful_ops": 2,
                            "bytes_sent": 0, "bytes_received": 2048}]
        }))
        .unwrap();
        assert_eq!(summary.total, None);
        assert_eq!(summary.categories.len(), 1);
    }

    #[test]
    fn test_report_requires_object() {
        assert!(UsageReport::from_value(&json!([1, 2])).is_err());
        let report = UsageReport::from_value(&json!({})).unwrap();
        assert!(report.entries.is_empty());
        assert!(report.summary.is_empty());
    }
}
