//! Turns a finished aggregation context into a [`MetricSnapshot`].

use crate::domain::accounting::{AggregationContext, UsageCounters};
use crate::domain::metrics::{MetricSnapshot, Series};
use std::time::Duration;

/// Builds the snapshot of one cycle. `cluster` is the static `cluster` label.
pub fn build_snapshot(ctx: &AggregationContext, cluster: &str, duration: Duration) -> MetricSnapshot {
    let mut snapshot = MetricSnapshot::empty();

    usage_counters(&mut snapshot, ctx, cluster);
    bucket_gauges(&mut snapshot, ctx, cluster);
    user_gauges(&mut snapshot, ctx, cluster);
    global_gauges(&mut snapshot, ctx, duration);

    snapshot
}

fn push_usage(
    snapshot: &mut MetricSnapshot,
    series: [Series; 4],
    labels: &[&str],
    counters: &UsageCounters,
) {
    let [ops, successful_ops, bytes_sent, bytes_received] = series;
    snapshot.push(ops, labels, counters.ops as f64);
    snapshot.push(successful_ops, labels, counters.successful_ops as f64);
    snapshot.push(bytes_sent, labels, counters.bytes_sent as f64);
    snapshot.push(bytes_received, labels, counters.bytes_received as f64);
}

fn usage_counters(snapshot: &mut MetricSnapshot, ctx: &AggregationContext, cluster: &str) {
    for (key, counters) in ctx.usage() {
        let tags = ctx.tags_for(&key.bucket, &key.owner);
        push_usage(
            snapshot,
            [
                Series::UsageOps,
                Series::UsageSuccessfulOps,
                Series::UsageBytesSent,
                Series::UsageBytesReceived,
            ],
            &[&key.bucket, &key.owner, &key.category, cluster, tags],
            counters,
        );
    }
}

fn bucket_gauges(snapshot: &mut MetricSnapshot, ctx: &AggregationContext, cluster: &str) {
    for bucket in ctx.buckets() {
        let labels: [&str; 5] = [
            &bucket.name,
            &bucket.owner,
            &bucket.zonegroup,
            cluster,
            &bucket.tags,
        ];
        snapshot.push(Series::BucketUsageBytes, &labels, bucket.usage_bytes as f64);
        snapshot.push(Series::BucketUtilizedBytes, &labels, bucket.utilized_bytes as f64);
        snapshot.push(Series::BucketObjects, &labels, bucket.objects as f64);
        snapshot.push(Series::BucketShards, &labels, bucket.shards as f64);

        if let Some(quota) = &bucket.quota {
            snapshot.push(Series::BucketQuotaEnabled, &labels, flag(quota.enabled));
            snapshot.push(Series::BucketQuotaMaxSize, &labels, quota.max_size as f64);
            snapshot.push(Series::BucketQuotaMaxSizeBytes, &labels, quota.max_size_bytes as f64);
            snapshot.push(Series::BucketQuotaMaxObjects, &labels, quota.max_objects as f64);
        }
    }

    for (key, counters) in ctx.bucket_usage() {
        push_usage(
            snapshot,
            [
                Series::BucketOps,
                Series::BucketSuccessfulOps,
                Series::BucketBytesSent,
                Series::BucketBytesReceived,
            ],
            &[&key.bucket, &key.owner, cluster],
            counters,
        );
    }
}

fn user_gauges(snapshot: &mut MetricSnapshot, ctx: &AggregationContext, cluster: &str) {
    for user in ctx.users() {
        let labels = [user.uid.as_str(), cluster];

        if let Some(quota) = &user.quota {
            snapshot.push(Series::UserQuotaEnabled, &labels, flag(quota.enabled));
            snapshot.push(Series::UserQuotaMaxSize, &labels, quota.max_size as f64);
            snapshot.push(Series::UserQuotaMaxSizeBytes, &labels, quota.max_size_bytes as f64);
            snapshot.push(Series::UserQuotaMaxObjects, &labels, quota.max_objects as f64);
        }

        if let Some(info) = &user.info {
            snapshot.push(
                Series::UserMetadata,
                &[
                    user.uid.as_str(),
                    info.display_name.as_str(),
                    info.email.as_str(),
                    info.storage_class.as_str(),
                    cluster,
                ],
                1.0,
            );
            if let Some(stats) = info.stats {
                snapshot.push(Series::UserTotalBytes, &labels, stats.total_bytes as f64);
                snapshot.push(Series::UserTotalObjects, &labels, stats.total_objects as f64);
            }
        }
    }

    for (user, report) in ctx.user_summaries() {
        for (category, counters) in &report.categories {
            push_usage(
                snapshot,
                [
                    Series::UserOps,
                    Series::UserSuccessfulOps,
                    Series::UserBytesSent,
                    Series::UserBytesReceived,
                ],
                &[user.as_str(), cluster, category],
                counters,
            );
        }

        let labels = [user.as_str(), cluster];
        if let Some(total) = &report.total {
            push_usage(
                snapshot,
                [
                    Series::UserTotalOps,
                    Series::UserTotalSuccessfulOps,
                    Series::UserTotalBytesSent,
                    Series::UserTotalBytesReceived,
                ],
                &labels,
                total,
            );
        }
        if let Some(buckets) = report.buckets {
            snapshot.push(Series::UserTotalBuckets, &labels, buckets as f64);
        }
    }
}

fn global_gauges(snapshot: &mut MetricSnapshot, ctx: &AggregationContext, duration: Duration) {
    const NONE: &[&str] = &[];
    let totals = ctx.totals();

    snapshot.push(Series::ScrapeDurationSeconds, NONE, duration.as_secs_f64());
    snapshot.push(Series::TotalUsers, NONE, ctx.user_count() as f64);
    snapshot.push(Series::TotalBuckets, NONE, ctx.bucket_count() as f64);
    snapshot.push(Series::TotalObjects, NONE, totals.objects as f64);
    snapshot.push(Series::TotalBytes, NONE, totals.bytes as f64);
    snapshot.push(Series::TotalBytesSent, NONE, totals.bytes_sent as f64);
    snapshot.push(Series::TotalBytesReceived, NONE, totals.bytes_received as f64);
    snapshot.push(Series::TotalOps, NONE, totals.ops as f64);
    snapshot.push(Series::TotalSuccessfulOps, NONE, totals.successful_ops as f64);

    for (category, ops) in ctx.category_ops() {
        snapshot.push(Series::TotalCategoryOps, &[category], *ops as f64);
    }
    for (category, ops) in ctx.category_successful_ops() {
        snapshot.push(Series::TotalCategorySuccessfulOps, &[category], *ops as f64);
    }
}

fn flag(enabled: bool) -> f64 {
    if enabled { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounting::{
        ActiveUsers, BucketUsageBin, CategoryCounters, EligibilityFilter, Quota, UsageEntry,
        UserInfo, UserRecord,
    };
    use serde_json::json;

    fn ctx_with_users(users: &[&str]) -> AggregationContext {
        AggregationContext::new(
            EligibilityFilter::default(),
            Some(ActiveUsers::new(users.iter().map(|u| u.to_string()))),
        )
    }

    #[test]
    fn test_empty_cycle_reports_zero_globals() {
        let ctx = AggregationContext::new(EligibilityFilter::default(), None);
        let snapshot = build_snapshot(&ctx, "ceph", Duration::from_millis(250));

        assert_eq!(snapshot.value(Series::TotalUsers, &[]), Some(0.0));
        assert_eq!(snapshot.value(Series::TotalBuckets, &[]), Some(0.0));
        assert_eq!(snapshot.value(Series::ScrapeDurationSeconds, &[]), Some(0.25));
        assert!(snapshot.samples(Series::UsageOps).is_empty());
        assert_eq!(snapshot.families().len(), Series::ALL.len());
    }

    #[test]
    fn test_usage_counters_carry_bucket_tags() {
        let mut ctx = ctx_with_users(&["alice"]);
        ctx.ingest_bucket_stats(&[json!({
            "bucket": "photos", "owner": "alice", "tagset": {"team": "media"}
        })]);
        ctx.ingest_usage_entries(&[UsageEntry {
            owner: "alice".to_string(),
            buckets: vec![BucketUsageBin {
                bucket: "photos".to_string(),
                owner: Some("alice".to_string()),
                categories: vec![CategoryCounters {
                    category: "get_obj".to_string(),
                    counters: UsageCounters {
                        ops: 3,
                        successful_ops: 3,
                        bytes_sent: 30,
                        bytes_received: 0,
                    },
                }],
            }],
        }]);

        let snapshot = build_snapshot(&ctx, "ceph", Duration::ZERO);
        let labels = ["photos", "alice", "get_obj", "ceph", "team=media"];
        assert_eq!(snapshot.value(Series::UsageOps, &labels), Some(3.0));
        assert_eq!(snapshot.value(Series::UsageBytesSent, &labels), Some(30.0));
        assert_eq!(snapshot.value(Series::UsageBytesReceived, &labels), Some(0.0));
    }

    #[test]
    fn test_bucket_quota_only_when_present() {
        let mut ctx = ctx_with_users(&[]);
        ctx.ingest_bucket_stats(&[
            json!({"bucket": "q", "owner": "o", "zonegroup": "zg",
                   "bucket_quota": {"enabled": true, "max_size": 1, "max_size_kb": 10, "max_objects": 5}}),
            json!({"bucket": "nq", "owner": "o", "zonegroup": "zg"}),
        ]);
        let snapshot = build_snapshot(&ctx, "ceph", Duration::ZERO);

        let q = ["q", "o", "zg", "ceph", ""];
        assert_eq!(snapshot.value(Series::BucketQuotaEnabled, &q), Some(1.0));
        assert_eq!(snapshot.value(Series::BucketQuotaMaxSizeBytes, &q), Some(10240.0));
        assert_eq!(snapshot.samples(Series::BucketQuotaEnabled).len(), 1);
        assert_eq!(snapshot.samples(Series::BucketShards).len(), 2);
        assert_eq!(snapshot.value(Series::TotalBuckets, &[]), Some(2.0));
    }

    #[test]
    fn test_user_metadata_always_has_string_labels() {
        let mut ctx = ctx_with_users(&["alice"]);
        ctx.record_user(UserRecord {
            uid: "alice".to_string(),
            quota: Some(Quota {
                enabled: false,
                max_size: -1,
                max_size_bytes: 0,
                max_objects: -1,
            }),
            info: Some(UserInfo {
                display_name: String::new(),
                email: String::new(),
                storage_class: String::new(),
                stats: None,
            }),
        });
        let snapshot = build_snapshot(&ctx, "ceph", Duration::ZERO);

        assert_eq!(
            snapshot.value(Series::UserMetadata, &["alice", "", "", "", "ceph"]),
            Some(1.0)
        );
        assert_eq!(snapshot.value(Series::UserQuotaEnabled, &["alice", "ceph"]), Some(0.0));
        assert!(snapshot.samples(Series::UserTotalBytes).is_empty());
        assert!(snapshot.samples(Series::UserTotalObjects).is_empty());
    }
}
