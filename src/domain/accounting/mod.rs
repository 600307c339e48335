//! Accounting records and the aggregation passes run over them.

pub mod aggregator;
pub mod bucket;
pub mod context;
pub mod eligibility;
pub mod schema;
pub mod summary;
pub mod usage;
pub mod user;

pub use bucket::{BucketStat, Quota, normalize_bucket};
pub use context::{AggregationContext, BucketKey, GlobalTotals, UsageKey, UserSummaryReport};
pub use eligibility::{BucketLifecycle, EligibilityFilter};
pub use usage::{
    BUCKET_ROOT, BucketUsageBin, CategoryCounters, UsageCounters, UsageEntry, UsageReport,
    UserUsageSummary,
};
pub use user::{ActiveUsers, UserInfo, UserRecord, UserStats};
