//! Gateway connection settings parsed from environment variables.

use super::{Lookup, parse_bool, parse_number};
use anyhow::Result;
use std::time::Duration;

/// Where and how to reach the admin API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayEnvConfig {
    /// Base URL, always with a scheme and a trailing `/`
    pub server: String,
    pub admin_entry: String,
    pub access_key: String,
    pub secret_key: String,
    pub insecure: bool,
    pub region: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for GatewayEnvConfig {
    fn default() -> Self {
        Self {
            server: "http://radosgw:80/".to_string(),
            admin_entry: "admin".to_string(),
            access_key: "NA".to_string(),
            secret_key: "NA".to_string(),
            insecure: false,
            region: "us-east-1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 0,
        }
    }
}

impl GatewayEnvConfig {
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            server: normalize_server(
                &lookup("RADOSGW_SERVER").unwrap_or_else(|| "http://radosgw:80".to_string()),
            ),
            admin_entry: lookup("ADMIN_ENTRY").unwrap_or(defaults.admin_entry),
            access_key: lookup("ACCESS_KEY").unwrap_or(defaults.access_key),
            secret_key: lookup("SECRET_KEY").unwrap_or(defaults.secret_key),
            insecure: parse_bool(lookup, "RADOSGW_INSECURE", defaults.insecure)?,
            region: lookup("RADOSGW_REGION").unwrap_or(defaults.region),
            timeout: Duration::from_secs(parse_number(
                lookup,
                "RADOSGW_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            max_retries: parse_number(lookup, "RADOSGW_MAX_RETRIES", defaults.max_retries)?,
        })
    }

    /// URL of the admin entry, e.g. `http://radosgw:80/admin/`
    pub fn admin_base_url(&self) -> String {
        let entry = self.admin_entry.trim_matches('/');
        if entry.is_empty() {
            self.server.clone()
        } else {
            format!("{}{}/", self.server, entry)
        }
    }
}

/// Prefixes `http://` when no scheme is given and appends the trailing `/`.
pub fn normalize_server(raw: &str) -> String {
    let raw = raw.trim();
    let mut server = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    if !server.ends_with('/') {
        server.push('/');
    }
    server
}
