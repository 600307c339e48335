//! Listener and collection settings parsed from environment variables.

use super::{Lookup, parse_bool, parse_number};
use crate::domain::accounting::EligibilityFilter;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterEnvConfig {
    pub port: u16,
    pub bind_address: String,
    /// Value of the `cluster` label
    pub cluster: String,
    pub skip_deleted_buckets: bool,
    pub skip_deleted_users: bool,
    pub debug: bool,
}

impl Default for ExporterEnvConfig {
    fn default() -> Self {
        Self {
            port: 9242,
            bind_address: "0.0.0.0".to_string(),
            cluster: "ceph".to_string(),
            skip_deleted_buckets: true,
            skip_deleted_users: true,
            debug: false,
        }
    }
}

impl ExporterEnvConfig {
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_number(lookup, "VIRTUAL_PORT", defaults.port)?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            cluster: lookup("CLUSTER_NAME").unwrap_or(defaults.cluster),
            skip_deleted_buckets: parse_bool(
                lookup,
                "SKIP_DELETED_BUCKET",
                defaults.skip_deleted_buckets,
            )?,
            skip_deleted_users: parse_bool(lookup, "SKIP_DELETED_USER", defaults.skip_deleted_users)?,
            debug: parse_bool(lookup, "DEBUG", defaults.debug)?,
        })
    }

    pub fn eligibility_filter(&self) -> EligibilityFilter {
        EligibilityFilter {
            skip_deleted_buckets: self.skip_deleted_buckets,
            skip_deleted_users: self.skip_deleted_users,
        }
    }
}
