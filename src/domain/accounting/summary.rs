//! Per-user usage summary pass.

use crate::domain::accounting::context::AggregationContext;
use crate::domain::accounting::usage::UserUsageSummary;

impl AggregationContext {
    /// Records per-user category and total counters for every eligible
    /// owner, and folds them into the process-wide totals and the two
    /// per-category histograms.
    pub fn ingest_usage_summary(&mut self, summaries: &[UserUsageSummary]) {
        for summary in summaries {
            if self
                .filter
                .skip_user(&summary.user, self.active_users.as_ref())
            {
                continue;
            }

            let buckets = self.user_buckets.get(&summary.user).copied();
            let report = self.user_summaries.entry(summary.user.clone()).or_default();
            report.buckets = buckets;

            for category in &summary.categories {
                report
                    .categories
                    .entry(category.category.clone())
                    .or_default()
                    .accumulate(&category.counters);

                let ops = self
                    .category_ops
                    .entry(category.category.clone())
                    .or_insert(0);
                *ops = ops.saturating_add(category.counters.ops);
                let successful = self
                    .category_successful_ops
                    .entry(category.category.clone())
                    .or_insert(0);
                *successful = successful.saturating_add(category.counters.successful_ops);
            }

            if let Some(total) = &summary.total {
                report.total.get_or_insert_with(Default::default).accumulate(total);

                let totals = &mut self.totals;
                totals.bytes_sent = totals.bytes_sent.saturating_add(total.bytes_sent);
                totals.bytes_received = totals.bytes_received.saturating_add(total.bytes_received);
                totals.ops = totals.ops.saturating_add(total.ops);
                totals.successful_ops = totals.successful_ops.saturating_add(total.successful_ops);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::accounting::context::AggregationContext;
    use crate::domain::accounting::eligibility::EligibilityFilter;
    use crate::domain::accounting::usage::{CategoryCounters, UsageCounters, UserUsageSummary};
    use crate::domain::accounting::user::ActiveUsers;
    use serde_json::json;

    fn counters(ops: u64, successful_ops: u64) -> UsageCounters {
        UsageCounters {
            ops,
            successful_ops,
            bytes_sent: 100,
            bytes_received: 50,
        }
    }

    fn summary(user: &str, total: Option<UsageCounters>) -> UserUsageSummary {
        UserUsageSummary {
            user: user.to_string(),
            categories: vec![
                CategoryCounters {
                    category: "get_obj".to_string(),
                    counters: counters(4, 3),
                },
                CategoryCounters {
                    category: "put_obj".to_string(),
                    counters: counters(2, 2),
                },
            ],
            total,
        }
    }

    fn active(users: &[&str]) -> Option<ActiveUsers> {
        Some(ActiveUsers::new(users.iter().map(|u| u.to_string())))
    }

    #[test]
    fn test_eligible_users_feed_totals() {
        let mut ctx = AggregationContext::new(EligibilityFilter::default(), active(&["alice", "bob"]));
        ctx.ingest_usage_summary(&[
            summary("alice", Some(counters(6, 5))),
            summary("bob", Some(counters(6, 5))),
        ]);

        let totals = ctx.totals();
        assert_eq!(totals.ops, 12);
        assert_eq!(totals.successful_ops, 10);
        assert_eq!(totals.bytes_sent, 200);
        assert_eq!(totals.bytes_received, 100);
        assert_eq!(ctx.category_ops()["get_obj"], 8);
        assert_eq!(ctx.category_successful_ops()["get_obj"], 6);
        assert_eq!(ctx.category_ops()["put_obj"], 4);
        assert_eq!(ctx.category_successful_ops()["put_obj"], 4);
    }

    #[test]
    fn test_unlisted_user_is_skipped() {
        let mut ctx = AggregationContext::new(EligibilityFilter::default(), active(&["bob"]));
        ctx.ingest_usage_summary(&[summary("alice", Some(counters(6, 5)))]);
        assert!(ctx.user_summaries().is_empty());
        assert_eq!(ctx.totals().ops, 0);
        assert!(ctx.category_ops().is_empty());
    }

    #[test]
    fn test_missing_total_block() {
        let mut ctx = AggregationContext::new(EligibilityFilter::default(), active(&["alice"]));
        ctx.ingest_usage_summary(&[summary("alice", None)]);
        let report = &ctx.user_summaries()["alice"];
        assert_eq!(report.total, None);
        assert_eq!(report.categories.len(), 2);
        assert_eq!(ctx.totals().ops, 0);
    }

    #[test]
    fn test_bucket_count_attached_from_stats_pass() {
        let mut ctx = AggregationContext::new(EligibilityFilter::default(), active(&["alice"]));
        ctx.ingest_bucket_stats(&[
            json!({"bucket": "one", "owner": "alice"}),
            json!({"bucket": "two", "owner": "alice"}),
        ]);
        ctx.ingest_usage_summary(&[summary("alice", None)]);
        assert_eq!(ctx.user_summaries()["alice"].buckets, Some(2));
    }
}
