//! Signed HTTP client for the RADOS gateway admin API.

use crate::config::GatewayEnvConfig;
use crate::domain::errors::FetchError;
use crate::domain::ports::{AdminApi, AdminQuery};
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, HttpClientSettings};
use crate::infrastructure::radosgw::signing::{RequestSigner, canonical_query, encode_path};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use tracing::debug;
use url::Url;

pub struct RadosgwAdminClient {
    client: ClientWithMiddleware,
    signer: RequestSigner,
    /// `scheme://host[:port]`
    origin: String,
    /// Host header value, port included only when non-default
    host: String,
    /// Admin entry path with trailing `/` as `Url` encoded it, e.g. `/admin/`
    base_path: String,
}

impl RadosgwAdminClient {
    pub fn new(config: &GatewayEnvConfig) -> Result<Self> {
        let base = Url::parse(&config.admin_base_url())
            .with_context(|| format!("Invalid gateway URL: {}", config.server))?;
        let host_name = base
            .host_str()
            .with_context(|| format!("Gateway URL has no host: {}", config.server))?;
        let host = match base.port() {
            Some(port) => format!("{}:{}", host_name, port),
            None => host_name.to_string(),
        };

        let client = HttpClientFactory::create_client(HttpClientSettings {
            timeout: config.timeout,
            max_retries: config.max_retries,
            insecure: config.insecure,
        })
        .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            signer: RequestSigner::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                config.region.clone(),
            ),
            origin: format!("{}://{}", base.scheme(), host),
            host,
            base_path: base.path().to_string(),
        })
    }

    /// Path and canonical query of a request, as signed and sent. The base
    /// path is already encoded, only the resource gets encoded here.
    fn request_target(&self, query: &AdminQuery) -> (String, String) {
        let path = format!("{}{}", self.base_path, encode_path(&query.resource));
        (path, canonical_query(&query.wire_args()))
    }
}

#[async_trait]
impl AdminApi for RadosgwAdminClient {
    async fn fetch(&self, query: &AdminQuery) -> Result<Value, FetchError> {
        let (path, query_string) = self.request_target(query);
        let url = format!("{}{}?{}", self.origin, path, query_string);
        let signed = self
            .signer
            .sign_get(&self.host, &path, &query_string, chrono::Utc::now());

        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", signed.authorization)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                resource: query.resource.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Transport {
            resource: query.resource.clone(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(FetchError::Rejected {
                resource: query.resource.clone(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            resource: query.resource.clone(),
            reason: e.to_string(),
        })
    }
}
