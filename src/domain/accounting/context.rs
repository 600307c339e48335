//! Per-cycle aggregation state.
//!
//! An [`AggregationContext`] is created at the start of a poll cycle, fed by
//! the aggregation passes, read once by the snapshot builder and dropped. It
//! is never shared between cycles.

use crate::domain::accounting::bucket::{BucketStat, normalize_bucket};
use crate::domain::accounting::eligibility::{BucketLifecycle, EligibilityFilter};
use crate::domain::accounting::usage::UsageCounters;
use crate::domain::accounting::user::{ActiveUsers, UserRecord};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Key of the per-category usage counters
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UsageKey {
    pub owner: String,
    pub bucket: String,
    pub category: String,
}

impl UsageKey {
    pub fn new(owner: &str, bucket: &str, category: &str) -> Self {
        Self {
            owner: owner.to_string(),
            bucket: bucket.to_string(),
            category: category.to_string(),
        }
    }
}

/// One bucket identity, shared by the usage and bucket-stat passes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub bucket: String,
    pub owner: String,
}

impl BucketKey {
    pub fn new(bucket: &str, owner: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            owner: owner.to_string(),
        }
    }
}

/// Process-wide running totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalTotals {
    pub objects: u64,
    pub bytes: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub ops: u64,
    pub successful_ops: u64,
}

/// Summary-pass result for one eligible user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSummaryReport {
    pub categories: BTreeMap<String, UsageCounters>,
    pub total: Option<UsageCounters>,
    /// Buckets owned according to the bucket-stats pass
    pub buckets: Option<u64>,
}

#[derive(Debug)]
pub struct AggregationContext {
    pub(super) filter: EligibilityFilter,
    pub(super) active_users: Option<ActiveUsers>,

    pub(super) usage: BTreeMap<UsageKey, UsageCounters>,
    pub(super) bucket_usage: BTreeMap<BucketKey, UsageCounters>,

    pub(super) buckets: Vec<BucketStat>,
    pub(super) bucket_tags: HashMap<BucketKey, String>,
    pub(super) bucket_count: Option<usize>,
    pub(super) user_buckets: BTreeMap<String, u64>,

    pub(super) users: Vec<UserRecord>,
    pub(super) user_summaries: BTreeMap<String, UserSummaryReport>,

    pub(super) totals: GlobalTotals,
    pub(super) category_ops: BTreeMap<String, u64>,
    pub(super) category_successful_ops: BTreeMap<String, u64>,
}

impl AggregationContext {
    /// `active_users` is `None` when the user listing could not be fetched.
    pub fn new(filter: EligibilityFilter, active_users: Option<ActiveUsers>) -> Self {
        Self {
            filter,
            active_users,
            usage: BTreeMap::new(),
            bucket_usage: BTreeMap::new(),
            buckets: Vec::new(),
            bucket_tags: HashMap::new(),
            bucket_count: None,
            user_buckets: BTreeMap::new(),
            users: Vec::new(),
            user_summaries: BTreeMap::new(),
            totals: GlobalTotals::default(),
            category_ops: BTreeMap::new(),
            category_successful_ops: BTreeMap::new(),
        }
    }

    /// Folds `counters` into the value stored under `key`.
    ///
    /// Repeated keys are summed field by field, never overwritten, so the
    /// result is independent of the order keys arrive in.
    pub fn accumulate(&mut self, key: UsageKey, counters: &UsageCounters) {
        self.usage.entry(key).or_default().accumulate(counters);
    }

    /// Bucket-stats pass: normalizes every record, counts buckets per owner
    /// and remembers tags for the usage counters.
    ///
    /// Stat records carry no usage categories, so their lifecycle is always
    /// "unobserved" and the bucket rule keeps them.
    pub fn ingest_bucket_stats(&mut self, records: &[Value]) {
        let mut structured = 0;
        for value in records {
            let bucket = match normalize_bucket(value) {
                Ok(Some(bucket)) => bucket,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping bucket stat record: {}", e);
                    continue;
                }
            };
            structured += 1;

            if self
                .filter
                .skip_bucket(&bucket.name, BucketLifecycle::default())
            {
                continue;
            }

            *self.user_buckets.entry(bucket.owner.clone()).or_insert(0) += 1;
            self.bucket_tags.insert(
                BucketKey::new(&bucket.name, &bucket.owner),
                bucket.tags.clone(),
            );
            self.buckets.push(bucket);
        }
        self.bucket_count = Some(structured);
    }

    /// Records the quota and info lookups of one listed user.
    pub fn record_user(&mut self, user: UserRecord) {
        if let Some(stats) = user.info.as_ref().and_then(|info| info.stats) {
            self.totals.bytes = self.totals.bytes.saturating_add(stats.total_bytes);
            self.totals.objects = self.totals.objects.saturating_add(stats.total_objects);
        }
        self.users.push(user);
    }

    pub fn filter(&self) -> EligibilityFilter {
        self.filter
    }

    pub fn active_users(&self) -> Option<&ActiveUsers> {
        self.active_users.as_ref()
    }

    pub fn usage(&self) -> &BTreeMap<UsageKey, UsageCounters> {
        &self.usage
    }

    pub fn bucket_usage(&self) -> &BTreeMap<BucketKey, UsageCounters> {
        &self.bucket_usage
    }

    pub fn buckets(&self) -> &[BucketStat] {
        &self.buckets
    }

    /// Tags of a bucket seen in the bucket-stats pass, empty otherwise
    pub fn tags_for(&self, bucket: &str, owner: &str) -> &str {
        self.bucket_tags
            .get(&BucketKey::new(bucket, owner))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn buckets_owned_by(&self, owner: &str) -> Option<u64> {
        self.user_buckets.get(owner).copied()
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn user_summaries(&self) -> &BTreeMap<String, UserSummaryReport> {
        &self.user_summaries
    }

    pub fn totals(&self) -> GlobalTotals {
        self.totals
    }

    pub fn category_ops(&self) -> &BTreeMap<String, u64> {
        &self.category_ops
    }

    pub fn category_successful_ops(&self) -> &BTreeMap<String, u64> {
        &self.category_successful_ops
    }

    /// Listed users, `0` when the listing failed
    pub fn user_count(&self) -> usize {
        self.active_users.as_ref().map_or(0, ActiveUsers::len)
    }

    /// Structured bucket-stat records, `0` when the fetch failed
    pub fn bucket_count(&self) -> usize {
        self.bucket_count.unwrap_or(0)
    }
}
