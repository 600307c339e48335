//! Configuration module for the exporter.
//!
//! Settings come from environment variables (optionally a `.env` file),
//! split into the gateway connection and the exporter itself. Command-line
//! flags are applied on top by the binary.

mod exporter_config;
mod gateway_config;

pub use exporter_config::ExporterEnvConfig;
pub use gateway_config::{GatewayEnvConfig, normalize_server};

use anyhow::{Context, Result, bail};
use std::env;
use std::str::FromStr;

/// Variable lookup, `None` when unset
pub type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub gateway: GatewayEnvConfig,
    pub exporter: ExporterEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self> {
        Ok(Self {
            gateway: GatewayEnvConfig::from_lookup(lookup).context("Invalid gateway settings")?,
            exporter: ExporterEnvConfig::from_lookup(lookup)
                .context("Invalid exporter settings")?,
        })
    }
}

/// Reads a boolean variable: `1/0/true/false/yes/no`, case-insensitive.
pub(crate) fn parse_bool(lookup: &Lookup<'_>, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => bail!(
            "Invalid {}: {}. Must be one of 1, 0, true, false, yes, no",
            key,
            raw
        ),
    }
}

pub(crate) fn parse_number<T>(lookup: &Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid {}: {}", key, raw)),
        None => Ok(default),
    }
}
