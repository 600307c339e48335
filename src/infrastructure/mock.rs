use crate::domain::errors::FetchError;
use crate::domain::ports::{AdminApi, AdminQuery};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory admin API with canned responses.
///
/// Queries without a registered response are rejected with HTTP 404, the
/// way a gateway answers an unknown admin resource.
#[derive(Default)]
pub struct MockAdminApi {
    responses: HashMap<AdminQuery, Value>,
    transport_failures: Vec<AdminQuery>,
    latency: Option<Duration>,
    requests: Mutex<Vec<AdminQuery>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockAdminApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, query: &AdminQuery, payload: Value) -> Self {
        self.responses.insert(query.clone(), payload);
        self
    }

    /// Makes `query` fail as if the connection could not be established
    pub fn with_transport_failure(mut self, query: &AdminQuery) -> Self {
        self.transport_failures.push(query.clone());
        self
    }

    /// Delays every response, to observe overlapping cycles
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<AdminQuery> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Highest number of requests that were ever pending at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdminApi for MockAdminApi {
    async fn fetch(&self, query: &AdminQuery) -> Result<Value, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(query.clone());

        let pending = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(pending, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.transport_failures.contains(query) {
            return Err(FetchError::Transport {
                resource: query.resource.clone(),
                reason: "connection refused".to_string(),
            });
        }

        self.responses
            .get(query)
            .cloned()
            .ok_or_else(|| FetchError::Rejected {
                resource: query.resource.clone(),
                status: 404,
                body: "NoSuchKey".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registered_and_unregistered_queries() {
        let api = MockAdminApi::new().with_response(&AdminQuery::user_list(), json!({"keys": []}));

        let listed = tokio_test::block_on(api.fetch(&AdminQuery::user_list()));
        assert_eq!(listed.unwrap(), json!({"keys": []}));

        let missing = tokio_test::block_on(api.fetch(&AdminQuery::bucket_stats()));
        assert!(matches!(missing, Err(FetchError::Rejected { status: 404, .. })));
        assert_eq!(api.requests().len(), 2);
    }

    #[test]
    fn test_transport_failure() {
        let api = MockAdminApi::new()
            .with_response(&AdminQuery::usage_summary(), json!({}))
            .with_transport_failure(&AdminQuery::usage_summary());

        let result = tokio_test::block_on(api.fetch(&AdminQuery::usage_summary()));
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
