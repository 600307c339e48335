//! HTTP listener exposing `/metrics` and `/health`.

use crate::application::collector::UsageCollector;
use crate::infrastructure::observability::exposition::{self, CONTENT_TYPE};
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

pub fn router(collector: Arc<UsageCollector>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(collector)
}

/// Runs one poll cycle per request. Concurrent scrapes queue behind the
/// collector's cycle lock.
async fn metrics(State(collector): State<Arc<UsageCollector>>) -> Response {
    let snapshot = collector.collect().await;
    match exposition::render(&snapshot) {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

/// Binds `addr` and serves until Ctrl-C or SIGTERM.
pub async fn serve(addr: SocketAddr, collector: Arc<UsageCollector>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving metrics on http://{}/metrics", addr);

    axum::serve(listener, router(collector))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Ctrl+C handler installation failed: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler installation failed: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::collector::CollectorSettings;
    use crate::domain::ports::AdminQuery;
    use crate::infrastructure::mock::MockAdminApi;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn app(api: MockAdminApi) -> Router {
        router(Arc::new(UsageCollector::new(
            Arc::new(api),
            CollectorSettings::default(),
        )))
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get_body(app(MockAdminApi::new()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let api = MockAdminApi::new().with_response(&AdminQuery::user_list(), json!({"keys": ["a", "b"]}));
        let (status, content_type, body) = get_body(app(api), "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/plain; version=0.0.4"));
        assert!(body.contains("radosgw_usage_total_users 2"));
        assert!(body.contains("# TYPE radosgw_usage_ops_total counter"));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (status, _, _) = get_body(app(MockAdminApi::new()), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
