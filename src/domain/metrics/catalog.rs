//! The fixed catalog of exported series.
//!
//! Names and label sets are the exporter's public contract and do not
//! depend on the gateway release being polled.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDef {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

const USAGE_LABELS: &[&str] = &["bucket", "owner", "category", "cluster", "tags"];
const BUCKET_LABELS: &[&str] = &["bucket", "owner", "zonegroup", "cluster", "tags"];
const BUCKET_USAGE_LABELS: &[&str] = &["bucket", "owner", "cluster"];
const USER_METADATA_LABELS: &[&str] = &["user", "display_name", "email", "storage_class", "cluster"];
const USER_LABELS: &[&str] = &["user", "cluster"];
const USER_CATEGORY_LABELS: &[&str] = &["user", "cluster", "category"];
const CATEGORY_LABELS: &[&str] = &["category"];
const NO_LABELS: &[&str] = &[];

/// Every series family the exporter declares, in exposition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    // Per bucket and category, from the usage log
    UsageOps,
    UsageSuccessfulOps,
    UsageBytesSent,
    UsageBytesReceived,

    // Per bucket
    BucketUsageBytes,
    BucketBytesSent,
    BucketBytesReceived,
    BucketSuccessfulOps,
    BucketOps,
    BucketUtilizedBytes,
    BucketObjects,
    BucketQuotaEnabled,
    BucketQuotaMaxSize,
    BucketQuotaMaxSizeBytes,
    BucketQuotaMaxObjects,
    BucketShards,

    // Per user
    UserMetadata,
    UserQuotaEnabled,
    UserQuotaMaxSize,
    UserQuotaMaxSizeBytes,
    UserQuotaMaxObjects,
    UserTotalObjects,
    UserTotalBytes,
    UserTotalBytesSent,
    UserTotalBytesReceived,
    UserBytesSent,
    UserBytesReceived,
    UserTotalOps,
    UserOps,
    UserSuccessfulOps,
    UserTotalSuccessfulOps,
    UserTotalBuckets,

    // Process-wide
    ScrapeDurationSeconds,
    TotalBuckets,
    TotalUsers,
    TotalObjects,
    TotalBytes,
    TotalBytesSent,
    TotalBytesReceived,
    TotalOps,
    TotalSuccessfulOps,
    TotalCategoryOps,
    TotalCategorySuccessfulOps,
}

impl Series {
    pub const ALL: [Series; 43] = [
        Series::UsageOps,
        Series::UsageSuccessfulOps,
        Series::UsageBytesSent,
        Series::UsageBytesReceived,
        Series::BucketUsageBytes,
        Series::BucketBytesSent,
        Series::BucketBytesReceived,
        Series::BucketSuccessfulOps,
        Series::BucketOps,
        Series::BucketUtilizedBytes,
        Series::BucketObjects,
        Series::BucketQuotaEnabled,
        Series::BucketQuotaMaxSize,
        Series::BucketQuotaMaxSizeBytes,
        Series::BucketQuotaMaxObjects,
        Series::BucketShards,
        Series::UserMetadata,
        Series::UserQuotaEnabled,
        Series::UserQuotaMaxSize,
        Series::UserQuotaMaxSizeBytes,
        Series::UserQuotaMaxObjects,
        Series::UserTotalObjects,
        Series::UserTotalBytes,
        Series::UserTotalBytesSent,
        Series::UserTotalBytesReceived,
        Series::UserBytesSent,
        Series::UserBytesReceived,
        Series::UserTotalOps,
        Series::UserOps,
        Series::UserSuccessfulOps,
        Series::UserTotalSuccessfulOps,
        Series::UserTotalBuckets,
        Series::ScrapeDurationSeconds,
        Series::TotalBuckets,
        Series::TotalUsers,
        Series::TotalObjects,
        Series::TotalBytes,
        Series::TotalBytesSent,
        Series::TotalBytesReceived,
        Series::TotalOps,
        Series::TotalSuccessfulOps,
        Series::TotalCategoryOps,
        Series::TotalCategorySuccessfulOps,
    ];

    /// Position in [`Series::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn def(self) -> MetricDef {
        use MetricKind::{Counter, Gauge};

        let (name, help, kind, labels) = match self {
            Series::UsageOps => ("radosgw_usage_ops_total", "Number of operations", Counter, USAGE_LABELS),
            Series::UsageSuccessfulOps => (
                "radosgw_usage_successful_ops_total",
                "Number of successful operations",
                Counter,
                USAGE_LABELS,
            ),
            Series::UsageBytesSent => (
                "radosgw_usage_sent_bytes_total",
                "Bytes sent by the RADOSGW",
                Counter,
                USAGE_LABELS,
            ),
            Series::UsageBytesReceived => (
                "radosgw_usage_received_bytes_total",
                "Bytes received by the RADOSGW",
                Counter,
                USAGE_LABELS,
            ),
            Series::BucketUsageBytes => ("radosgw_usage_bucket_bytes", "Bucket used bytes", Gauge, BUCKET_LABELS),
            Series::BucketBytesSent => (
                "radosgw_usage_bucket_bytes_sent",
                "Number of bytes sent",
                Gauge,
                BUCKET_USAGE_LABELS,
            ),
            Series::BucketBytesReceived => (
                "radosgw_usage_bucket_bytes_received",
                "Number of bytes received",
                Gauge,
                BUCKET_USAGE_LABELS,
            ),
            Series::BucketSuccessfulOps => (
                "radosgw_usage_bucket_successful_ops",
                "Number of successful operations",
                Gauge,
                BUCKET_USAGE_LABELS,
            ),
            Series::BucketOps => ("radosgw_usage_bucket_ops", "Number of operations", Gauge, BUCKET_USAGE_LABELS),
            Series::BucketUtilizedBytes => (
                "radosgw_usage_bucket_utilized_bytes",
                "Bucket utilized bytes",
                Gauge,
                BUCKET_LABELS,
            ),
            Series::BucketObjects => (
                "radosgw_usage_bucket_objects",
                "Number of objects in bucket",
                Gauge,
                BUCKET_LABELS,
            ),
            Series::BucketQuotaEnabled => (
                "radosgw_usage_bucket_quota_enabled",
                "Quota enabled for bucket",
                Gauge,
                BUCKET_LABELS,
            ),
            Series::BucketQuotaMaxSize => (
                "radosgw_usage_bucket_quota_size",
                "Maximum allowed bucket size",
                Gauge,
                BUCKET_LABELS,
            ),
            Series::BucketQuotaMaxSizeBytes => (
                "radosgw_usage_bucket_quota_size_bytes",
                "Maximum allowed bucket size in bytes",
                Gauge,
                BUCKET_LABELS,
            ),
            Series::BucketQuotaMaxObjects => (
                "radosgw_usage_bucket_quota_size_objects",
                "Maximum allowed bucket size in number of objects",
                Gauge,
                BUCKET_LABELS,
            ),
            Series::BucketShards => (
                "radosgw_usage_bucket_shards",
                "Number of shards in bucket",
                Gauge,
                BUCKET_LABELS,
            ),
            Series::UserMetadata => ("radosgw_user_metadata", "User metadata", Gauge, USER_METADATA_LABELS),
            Series::UserQuotaEnabled => (
                "radosgw_usage_user_quota_enabled",
                "User quota enabled",
                Gauge,
                USER_LABELS,
            ),
            Series::UserQuotaMaxSize => (
                "radosgw_usage_user_quota_size",
                "Maximum allowed size for user",
                Gauge,
                USER_LABELS,
            ),
            Series::UserQuotaMaxSizeBytes => (
                "radosgw_usage_user_quota_size_bytes",
                "Maximum allowed size in bytes for user",
                Gauge,
                USER_LABELS,
            ),
            Series::UserQuotaMaxObjects => (
                "radosgw_usage_user_quota_size_objects",
                "Maximum allowed number of objects for user",
                Gauge,
                USER_LABELS,
            ),
            Series::UserTotalObjects => (
                "radosgw_usage_user_total_objects",
                "Usage of objects by user",
                Gauge,
                USER_LABELS,
            ),
            Series::UserTotalBytes => (
                "radosgw_usage_user_total_bytes",
                "Usage of bytes by user",
                Gauge,
                USER_LABELS,
            ),
            Series::UserTotalBytesSent => (
                "radosgw_usage_user_total_bytes_sent",
                "Number of bytes sent",
                Gauge,
                USER_LABELS,
            ),
            Series::UserTotalBytesReceived => (
                "radosgw_usage_user_total_bytes_received",
                "Number of bytes received",
                Gauge,
                USER_LABELS,
            ),
            Series::UserBytesSent => (
                "radosgw_usage_user_bytes_sent",
                "Number of bytes sent",
                Gauge,
                USER_CATEGORY_LABELS,
            ),
            Series::UserBytesReceived => (
                "radosgw_usage_user_bytes_received",
                "Number of bytes received",
                Gauge,
                USER_CATEGORY_LABELS,
            ),
            Series::UserTotalOps => ("radosgw_usage_user_total_ops", "Number of operations", Gauge, USER_LABELS),
            Series::UserOps => ("radosgw_usage_user_ops", "Number of operations", Gauge, USER_CATEGORY_LABELS),
            Series::UserSuccessfulOps => (
                "radosgw_usage_user_successful_ops",
                "Number of successful operations",
                Gauge,
                USER_CATEGORY_LABELS,
            ),
            Series::UserTotalSuccessfulOps => (
                "radosgw_usage_user_total_successful_ops",
                "Number of successful operations",
                Gauge,
                USER_LABELS,
            ),
            Series::UserTotalBuckets => (
                "radosgw_usage_user_total_buckets",
                "Number of buckets per user",
                Gauge,
                USER_LABELS,
            ),
            Series::ScrapeDurationSeconds => (
                "radosgw_usage_scrape_duration_seconds",
                "Amount of time each scrape takes",
                Gauge,
                NO_LABELS,
            ),
            Series::TotalBuckets => ("radosgw_usage_total_buckets", "Number of buckets", Gauge, NO_LABELS),
            Series::TotalUsers => ("radosgw_usage_total_users", "Number of users", Gauge, NO_LABELS),
            Series::TotalObjects => ("radosgw_usage_total_objects", "Usage of objects by all users", Gauge, NO_LABELS),
            Series::TotalBytes => ("radosgw_usage_total_bytes", "Usage of bytes by all users", Gauge, NO_LABELS),
            Series::TotalBytesSent => ("radosgw_usage_total_bytes_sent", "Number of bytes sent", Gauge, NO_LABELS),
            Series::TotalBytesReceived => (
                "radosgw_usage_total_bytes_received",
                "Number of bytes received",
                Gauge,
                NO_LABELS,
            ),
            Series::TotalOps => ("radosgw_usage_total_ops", "Number of operations", Gauge, NO_LABELS),
            Series::TotalSuccessfulOps => (
                "radosgw_usage_total_successful_ops",
                "Number of successful operations",
                Gauge,
                NO_LABELS,
            ),
            Series::TotalCategoryOps => ("radosgw_usage_ops", "Number of operations", Gauge, CATEGORY_LABELS),
            Series::TotalCategorySuccessfulOps => (
                "radosgw_usage_successful_ops",
                "Number of successful operations",
                Gauge,
                CATEGORY_LABELS,
            ),
        };

        MetricDef {
            name,
            help,
            kind,
            labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (i, series) in Series::ALL.iter().enumerate() {
            assert_eq!(series.index(), i, "{:?} out of order", series);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = Series::ALL.iter().map(|s| s.def().name).collect();
        assert_eq!(names.len(), Series::ALL.len());
    }

    #[test]
    fn test_every_series_is_prefixed() {
        assert!(Series::ALL.iter().all(|s| s.def().name.starts_with("radosgw_")));
    }

    #[test]
    fn test_only_usage_log_series_are_counters() {
        let counters: Vec<_> = Series::ALL
            .iter()
            .filter(|s| s.def().kind == MetricKind::Counter)
            .copied()
            .collect();
        assert_eq!(
            counters,
            vec![
                Series::UsageOps,
                Series::UsageSuccessfulOps,
                Series::UsageBytesSent,
                Series::UsageBytesReceived
            ]
        );
    }
}
