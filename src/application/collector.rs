//! Scrape orchestration: one poll cycle from admin API to snapshot.

use crate::application::snapshot_builder::build_snapshot;
use crate::domain::accounting::{
    ActiveUsers, AggregationContext, EligibilityFilter, Quota, UsageReport, UserInfo, UserRecord,
};
use crate::domain::metrics::MetricSnapshot;
use crate::domain::ports::{AdminApi, AdminQuery};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Settings the collector needs from configuration
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Value of the `cluster` label
    pub cluster: String,
    pub filter: EligibilityFilter,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            cluster: "ceph".to_string(),
            filter: EligibilityFilter::default(),
        }
    }
}

/// Runs poll cycles against the admin API.
///
/// Each cycle owns a fresh [`AggregationContext`]. Cycles are serialized:
/// concurrent scrapes queue on `cycle_lock` and run one after another.
pub struct UsageCollector {
    api: Arc<dyn AdminApi>,
    settings: CollectorSettings,
    cycle_lock: Mutex<()>,
}

impl UsageCollector {
    pub fn new(api: Arc<dyn AdminApi>, settings: CollectorSettings) -> Self {
        Self {
            api,
            settings,
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Runs one full cycle. Fetch failures only drop the affected section.
    pub async fn collect(&self) -> MetricSnapshot {
        let _cycle = self.cycle_lock.lock().await;
        let start = Instant::now();

        let usage = self.fetch_usage().await;
        let bucket_stats = self.fetch_bucket_stats().await;
        let users = self.fetch_active_users().await;

        let mut ctx = AggregationContext::new(self.settings.filter, users);

        if let Some(records) = &bucket_stats {
            ctx.ingest_bucket_stats(records);
        }

        if let Some(report) = &usage {
            ctx.ingest_usage_entries(&report.entries);
        }

        let uids: Vec<String> = ctx
            .active_users()
            .map(|users| users.iter().map(str::to_string).collect())
            .unwrap_or_default();
        for uid in uids {
            let record = self.fetch_user(uid).await;
            ctx.record_user(record);
        }

        if let Some(report) = &usage {
            ctx.ingest_usage_summary(&report.summary);
            ctx.ingest_bucket_usage_summary(&report.entries);
        }

        let elapsed = start.elapsed();
        let snapshot = build_snapshot(&ctx, &self.settings.cluster, elapsed);
        info!(
            "Scrape finished in {:.3}s: {} samples, {} users, {} buckets",
            elapsed.as_secs_f64(),
            snapshot.sample_count(),
            ctx.user_count(),
            ctx.bucket_count()
        );
        snapshot
    }

    /// Issues one request, logging and swallowing failures.
    async fn fetch(&self, query: &AdminQuery) -> Option<Value> {
        match self.api.fetch(query).await {
            Ok(payload) => {
                debug!("Admin API {} returned: {}", query, payload);
                Some(payload)
            }
            Err(e) => {
                warn!("Admin API request {} failed: {}", query, e);
                None
            }
        }
    }

    async fn fetch_usage(&self) -> Option<UsageReport> {
        let payload = self.fetch(&AdminQuery::usage_summary()).await?;
        match UsageReport::from_value(&payload) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Ignoring usage response: {}", e);
                None
            }
        }
    }

    async fn fetch_bucket_stats(&self) -> Option<Vec<Value>> {
        match self.fetch(&AdminQuery::bucket_stats()).await? {
            Value::Array(records) => Some(records),
            other => {
                warn!(
                    "Ignoring bucket stats response: expected a list, got {}",
                    other
                );
                None
            }
        }
    }

    /// `user?list`, falling back to `metadata/user` on older gateways.
    async fn fetch_active_users(&self) -> Option<ActiveUsers> {
        if let Some(users) = self
            .fetch(&AdminQuery::user_list())
            .await
            .as_ref()
            .and_then(ActiveUsers::from_listing)
        {
            return Some(users);
        }

        debug!("User listing unavailable, trying metadata/user");
        let payload = self.fetch(&AdminQuery::metadata_users()).await?;
        let users = ActiveUsers::from_listing(&payload);
        if users.is_none() {
            warn!("Ignoring metadata/user response: not a list of user ids");
        }
        users
    }

    /// Quota and info lookups of one user, each failing independently.
    async fn fetch_user(&self, uid: String) -> UserRecord {
        let quota = match self.fetch(&AdminQuery::user_quota(&uid)).await {
            Some(payload) => Quota::from_value(&payload, "user quota")
                .inspect_err(|e| warn!("Ignoring quota of user {}: {}", uid, e))
                .ok(),
            None => None,
        };

        let info = match self.fetch(&AdminQuery::user_info(&uid)).await {
            Some(payload) => UserInfo::from_value(&payload)
                .inspect_err(|e| warn!("Ignoring info of user {}: {}", uid, e))
                .ok(),
            None => None,
        };

        UserRecord { uid, quota, info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::Series;
    use crate::infrastructure::mock::MockAdminApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_everything_failing_still_yields_a_snapshot() {
        let api = Arc::new(MockAdminApi::new());
        let collector = UsageCollector::new(api.clone(), CollectorSettings::default());

        let snapshot = collector.collect().await;

        assert_eq!(snapshot.value(Series::TotalUsers, &[]), Some(0.0));
        assert_eq!(snapshot.value(Series::TotalBuckets, &[]), Some(0.0));
        assert!(snapshot.value(Series::ScrapeDurationSeconds, &[]).is_some());
        assert_eq!(snapshot.families().len(), Series::ALL.len());
        // usage, bucket, user?list, metadata/user
        assert_eq!(api.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_metadata_fallback_for_old_gateways() {
        let api = MockAdminApi::new()
            .with_response(&AdminQuery::user_list(), json!({"count": 1}))
            .with_response(&AdminQuery::metadata_users(), json!(["legacy"]));
        let collector = UsageCollector::new(Arc::new(api), CollectorSettings::default());

        let snapshot = collector.collect().await;
        assert_eq!(snapshot.value(Series::TotalUsers, &[]), Some(1.0));
    }

    #[tokio::test]
    async fn test_bucket_stats_must_be_a_list() {
        let api = MockAdminApi::new()
            .with_response(&AdminQuery::bucket_stats(), json!({"bucket": "not-a-list"}));
        let collector = UsageCollector::new(Arc::new(api), CollectorSettings::default());

        let snapshot = collector.collect().await;
        assert_eq!(snapshot.value(Series::TotalBuckets, &[]), Some(0.0));
        assert!(snapshot.samples(Series::BucketShards).is_empty());
    }
}
