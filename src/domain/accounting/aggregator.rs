//! Usage aggregation over paginated usage entries.
//!
//! The gateway caps usage entries at 1000 rows, so one owner can show up in
//! several entries and one (owner, bucket, category) in several bins. Bins
//! are folded with [`AggregationContext::accumulate`].

use crate::domain::accounting::context::{AggregationContext, BucketKey, UsageKey};
use crate::domain::accounting::eligibility::BucketLifecycle;
use crate::domain::accounting::usage::{BucketUsageBin, UsageEntry};
use std::collections::{HashMap, HashSet};

/// Bucket identity of a bin: the owner recorded on the bin wins over the
/// entry owner, so the identity is the same whichever gateway release
/// produced it.
fn bin_key(entry: &UsageEntry, bin: &BucketUsageBin) -> BucketKey {
    BucketKey::new(&bin.bucket, bin.owner.as_deref().unwrap_or(&entry.owner))
}

impl AggregationContext {
    /// Buckets the bucket rule suppresses. Lifecycle counts are summed over
    /// every bin of a bucket first, since creation and deletion can fall
    /// into different time bins.
    fn gone_buckets(&self, entries: &[UsageEntry]) -> HashSet<BucketKey> {
        let mut lifecycles: HashMap<BucketKey, BucketLifecycle> = HashMap::new();
        for entry in entries {
            for bin in &entry.buckets {
                lifecycles
                    .entry(bin_key(entry, bin))
                    .or_default()
                    .merge(bin.lifecycle());
            }
        }

        lifecycles
            .into_iter()
            .filter(|(key, lifecycle)| self.filter.skip_bucket(&key.bucket, *lifecycle))
            .map(|(key, _)| key)
            .collect()
    }

    /// Folds every eligible bin into the per-category usage map.
    pub fn ingest_usage_entries(&mut self, entries: &[UsageEntry]) {
        let gone = self.gone_buckets(entries);
        for entry in entries {
            for bin in &entry.buckets {
                if gone.contains(&bin_key(entry, bin)) {
                    continue;
                }
                for category in &bin.categories {
                    self.accumulate(
                        UsageKey::new(&entry.owner, &bin.bucket, &category.category),
                        &category.counters,
                    );
                }
            }
        }
    }

    /// Bucket-level usage pass: all categories of a bin summed and folded
    /// per bucket identity. Both the bucket and the user rule apply.
    pub fn ingest_bucket_usage_summary(&mut self, entries: &[UsageEntry]) {
        let gone = self.gone_buckets(entries);
        for entry in entries {
            for bin in &entry.buckets {
                let key = bin_key(entry, bin);
                if gone.contains(&key)
                    || self.filter.skip_user(&key.owner, self.active_users.as_ref())
                {
                    continue;
                }
                self.bucket_usage
                    .entry(key)
                    .or_default()
                    .accumulate(&bin.totals());
            }
        }
    }
}
