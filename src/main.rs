//! RADOS gateway usage exporter
//!
//! Polls the gateway admin API on every Prometheus scrape and exposes
//! per-bucket, per-user and cluster-wide usage on `/metrics`.
//!
//! # Usage
//! ```sh
//! radosgw-usage-exporter -H https://rgw.example:7480 -a ACCESS -s SECRET -p 9242
//! ```
//!
//! Every flag has an environment variable counterpart (`RADOSGW_SERVER`,
//! `ACCESS_KEY`, `SECRET_KEY`, `VIRTUAL_PORT`, ...), read from the process
//! environment or a `.env` file. Flags win over the environment.

use anyhow::{Context, Result};
use clap::Parser;
use radosgw_usage_exporter::application::collector::{CollectorSettings, UsageCollector};
use radosgw_usage_exporter::config::{Config, normalize_server};
use radosgw_usage_exporter::infrastructure::observability;
use radosgw_usage_exporter::infrastructure::radosgw::RadosgwAdminClient;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Prometheus exporter for RADOS gateway usage and bucket statistics",
    long_about = None
)]
struct Cli {
    /// Gateway base URL (RADOSGW_SERVER)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Admin API path prefix (ADMIN_ENTRY)
    #[arg(short = 'e', long)]
    admin_entry: Option<String>,

    /// S3 access key (ACCESS_KEY)
    #[arg(short, long)]
    access_key: Option<String>,

    /// S3 secret key (SECRET_KEY)
    #[arg(short, long)]
    secret_key: Option<String>,

    /// Skip TLS certificate verification (RADOSGW_INSECURE)
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Signing region (RADOSGW_REGION)
    #[arg(long)]
    region: Option<String>,

    /// Admin API request timeout in seconds (RADOSGW_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// Listen port (VIRTUAL_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Listen address (BIND_ADDRESS)
    #[arg(long)]
    bind_address: Option<String>,

    /// Value of the cluster label (CLUSTER_NAME)
    #[arg(short, long)]
    cluster: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.gateway.server = normalize_server(&host);
        }
        if let Some(admin_entry) = self.admin_entry {
            config.gateway.admin_entry = admin_entry;
        }
        if let Some(access_key) = self.access_key {
            config.gateway.access_key = access_key;
        }
        if let Some(secret_key) = self.secret_key {
            config.gateway.secret_key = secret_key;
        }
        if self.insecure {
            config.gateway.insecure = true;
        }
        if let Some(region) = self.region {
            config.gateway.region = region;
        }
        if let Some(timeout) = self.timeout {
            config.gateway.timeout = Duration::from_secs(timeout);
        }
        if let Some(port) = self.port {
            config.exporter.port = port;
        }
        if let Some(bind_address) = self.bind_address {
            config.exporter.bind_address = bind_address;
        }
        if let Some(cluster) = self.cluster {
            config.exporter.cluster = cluster;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut config = Config::from_env()?;
    Cli::parse().apply(&mut config);

    let level = if config.exporter.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!(
        "radosgw-usage-exporter {} starting",
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "Gateway: {} (cluster={}, insecure={}, skip deleted buckets={}, skip deleted users={})",
        config.gateway.admin_base_url(),
        config.exporter.cluster,
        config.gateway.insecure,
        config.exporter.skip_deleted_buckets,
        config.exporter.skip_deleted_users
    );

    let client = RadosgwAdminClient::new(&config.gateway)?;
    let collector = Arc::new(UsageCollector::new(
        Arc::new(client),
        CollectorSettings {
            cluster: config.exporter.cluster.clone(),
            filter: config.exporter.eligibility_filter(),
        },
    ));

    let ip: IpAddr = config
        .exporter
        .bind_address
        .parse()
        .with_context(|| format!("Invalid BIND_ADDRESS: {}", config.exporter.bind_address))?;
    observability::serve(SocketAddr::new(ip, config.exporter.port), collector).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_environment() {
        let mut config = Config::default();
        let cli = Cli::parse_from([
            "radosgw-usage-exporter",
            "-H",
            "rgw:7480",
            "-k",
            "-p",
            "9300",
            "-c",
            "eu-1",
        ]);
        cli.apply(&mut config);

        assert_eq!(config.gateway.server, "http://rgw:7480/");
        assert!(config.gateway.insecure);
        assert_eq!(config.exporter.port, 9300);
        assert_eq!(config.exporter.cluster, "eu-1");
        assert_eq!(config.gateway.access_key, "NA");
    }

    #[test]
    fn test_no_flags_keep_environment() {
        let mut config = Config::default();
        config.gateway.insecure = true;
        let expected = config.clone();
        Cli::default().apply(&mut config);
        assert!(config.gateway.insecure);
        assert_eq!(config, expected);
    }
}
