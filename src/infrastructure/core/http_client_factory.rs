use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;

/// Connection settings of the admin API client
#[derive(Debug, Clone, Copy)]
pub struct HttpClientSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    /// Accept invalid TLS certificates
    pub insecure: bool,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            insecure: false,
        }
    }
}

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a pooled HTTP client with retry middleware
    pub fn create_client(settings: HttpClientSettings) -> Result<ClientWithMiddleware, reqwest::Error> {
        // Exponential backoff on transient failures only (connect errors, 5xx, 429)
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);

        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(settings.timeout)
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(settings.insecure)
            .build()?;

        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}
