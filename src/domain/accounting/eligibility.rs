//! Deleted / never-created entity suppression.
//!
//! The usage log outlives the buckets and users it mentions. These rules
//! decide from lifecycle counters (buckets) or the active user listing
//! (users) whether an entity is gone. Every pass of a cycle goes through
//! the same [`EligibilityFilter`], so one entity always gets one verdict.

use crate::domain::accounting::usage::CategoryCounters;
use crate::domain::accounting::user::ActiveUsers;
use tracing::debug;

const CREATE_BUCKET: &str = "create_bucket";
const DELETE_BUCKET: &str = "delete_bucket";

/// Successful `create_bucket` / `delete_bucket` counts seen for a bucket.
/// `None` means the category was never observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketLifecycle {
    pub creations: Option<u64>,
    pub deletions: Option<u64>,
}

impl BucketLifecycle {
    pub fn from_categories(categories: &[CategoryCounters]) -> Self {
        categories
            .iter()
            .fold(BucketLifecycle::default(), |mut lifecycle, c| {
                let observed = Some(c.counters.successful_ops);
                match c.category.as_str() {
                    CREATE_BUCKET => lifecycle.creations = add_observed(lifecycle.creations, observed),
                    DELETE_BUCKET => lifecycle.deletions = add_observed(lifecycle.deletions, observed),
                    _ => {}
                }
                lifecycle
            })
    }

    /// Adds the counts seen in another bin of the same bucket. A category
    /// stays unobserved only if neither side observed it.
    pub fn merge(&mut self, other: BucketLifecycle) {
        self.creations = add_observed(self.creations, other.creations);
        self.deletions = add_observed(self.deletions, other.deletions);
    }

    /// True when the bucket was deleted or never created:
    /// - deleted without an observed creation,
    /// - observed with zero successful creations,
    /// - at least as many deletions as creations.
    ///
    /// Bucket records carrying no lifecycle categories at all are kept.
    pub fn is_gone(&self) -> bool {
        match (self.creations, self.deletions) {
            (None, Some(deletions)) => deletions > 0,
            (None, None) => false,
            (Some(0), _) => true,
            (Some(creations), Some(deletions)) => deletions >= creations,
            (Some(_), None) => false,
        }
    }
}

fn add_observed(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Toggles for the two suppression rules. Both default to enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityFilter {
    pub skip_deleted_buckets: bool,
    pub skip_deleted_users: bool,
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self {
            skip_deleted_buckets: true,
            skip_deleted_users: true,
        }
    }
}

impl EligibilityFilter {
    /// Filter that suppresses nothing
    pub fn disabled() -> Self {
        Self {
            skip_deleted_buckets: false,
            skip_deleted_users: false,
        }
    }

    pub fn skip_bucket(&self, bucket: &str, lifecycle: BucketLifecycle) -> bool {
        if !self.skip_deleted_buckets || !lifecycle.is_gone() {
            return false;
        }
        debug!(
            "Bucket {} deleted or never created ({:?}), skipping",
            bucket, lifecycle
        );
        true
    }

    /// A user missing from the active listing is treated as deleted. When
    /// the listing could not be fetched nobody can be confirmed active.
    pub fn skip_user(&self, uid: &str, active: Option<&ActiveUsers>) -> bool {
        if !self.skip_deleted_users || active.is_some_and(|users| users.contains(uid)) {
            return false;
        }
        debug!("User {} deleted or never created, skipping", uid);
        true
    }
}
