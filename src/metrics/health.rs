//! Health check endpoints and Prometheus metrics server
//!
//! This module provides HTTP endpoints for health checks and Prometheus metrics
//! for the tictac-room service using Axum.

use crate::metrics::collector::MetricsCollector;
use crate::service::health::{HealthCheck, HealthStatus, ServiceProbe};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "tictac-room";

/// Health server configuration
#[derive(Debug, Clone)]
pub struct HealthServerConfig {
    /// Port to bind the health server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HealthServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Shared state for the health server
#[derive(Clone)]
pub struct HealthServerState {
    pub metrics_collector: Arc<MetricsCollector>,
    pub probe: Option<ServiceProbe>,
}

/// Health server that provides HTTP endpoints for monitoring
pub struct HealthServer {
    config: HealthServerConfig,
    state: HealthServerState,
    shutdown_tx: broadcast::Sender<()>,
}

impl HealthServer {
    /// Create a new health server
    pub fn new(config: HealthServerConfig, metrics_collector: Arc<MetricsCollector>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state: HealthServerState {
                metrics_collector,
                probe: None,
            },
            shutdown_tx,
        }
    }

    /// Attach the probe used by the health and stats endpoints
    pub fn with_probe(mut self, probe: ServiceProbe) -> Self {
        self.state.probe = Some(probe);
        self
    }

    /// Start the health server
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid health server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind health server to {}", addr))?;

        info!("Health server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Health server shutdown signal received");
            })
            .await?;

        info!("Health server stopped");
        Ok(())
    }

    /// Create the Axum router with all health endpoints
    fn create_router(&self) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .route("/alive", get(alive_handler))
            .route("/metrics", get(metrics_handler))
            .route("/stats", get(stats_handler))
            .with_state(self.state.clone())
    }

    /// Stop the health server
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping health server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to health server: {}", e);
        }

        Ok(())
    }
}

/// Root endpoint handler - shows service information
async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/health",
            "/ready",
            "/alive",
            "/metrics",
            "/stats"
        ]
    }))
}

/// Lightweight health check endpoint handler
async fn health_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Health check requested");

    let Some(probe) = &state.probe else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": SERVICE_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "error": "Service not initialized"
            })),
        );
    };

    let status = HealthCheck::liveness_check(probe)
        .await
        .unwrap_or(HealthStatus::Unhealthy);
    let code = match status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": probe.service_name(),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint handler
async fn ready_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Readiness check requested");

    match &state.probe {
        Some(probe) => match HealthCheck::readiness_check(probe).await {
            Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
            Ok(HealthStatus::Degraded) => (StatusCode::OK, "Degraded but ready"),
            Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
            Err(e) => {
                error!("Readiness check failed: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
            }
        },
        None => (StatusCode::SERVICE_UNAVAILABLE, "Service not initialized"),
    }
}

/// Liveness check endpoint handler
async fn alive_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Liveness check requested");

    match &state.probe {
        Some(probe) => match HealthCheck::liveness_check(probe).await {
            Ok(HealthStatus::Healthy) => (StatusCode::OK, "Alive"),
            _ => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
        },
        None => (StatusCode::SERVICE_UNAVAILABLE, "Service not initialized"),
    }
}

/// Prometheus metrics endpoint handler
async fn metrics_handler(State(state): State<HealthServerState>) -> Response {
    debug!("Metrics endpoint requested");

    let metric_families = state.metrics_collector.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                metrics_output,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

/// Detailed service statistics endpoint handler
async fn stats_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Stats endpoint requested");

    let error_response = |error: &str| {
        Json(json!({
            "service": {
                "name": SERVICE_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "status": "error"
            },
            "error": error,
            "timestamp": chrono::Utc::now()
        }))
    };

    let Some(probe) = &state.probe else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            error_response("Service not initialized"),
        );
    };

    let health = match HealthCheck::check(probe).await {
        Ok(health) => health,
        Err(e) => {
            error!("Failed to get stats: {}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                error_response("Failed to get service stats"),
            );
        }
    };

    let arena = probe.arena().stats().ok();
    let stats = json!({
        "service": {
            "name": health.service,
            "version": health.version,
            "status": health.status,
            "uptime_seconds": health.stats.uptime_seconds
        },
        "sessions": {
            "active": health.stats.active_sessions,
            "created": health.stats.sessions_created,
            "won": health.stats.games_won,
            "draw_resets": health.stats.draw_resets,
            "moves_applied": health.stats.moves_applied
        },
        "players": {
            "waiting": health.stats.players_waiting
        },
        "arena": arena,
        "components": health.checks,
        "timestamp": chrono::Utc::now()
    });

    (StatusCode::OK, Json(stats))
}

/// Programmatic access to the same information as the endpoints
pub struct HealthEndpoints;

impl HealthEndpoints {
    /// Get health status as JSON
    pub async fn get_health_status(probe: Option<&ServiceProbe>) -> Result<serde_json::Value> {
        match probe {
            Some(probe) => {
                let status = HealthCheck::liveness_check(probe)
                    .await
                    .unwrap_or(HealthStatus::Unhealthy);
                Ok(json!({
                    "status": status,
                    "service": probe.service_name()
                }))
            }
            None => Ok(json!({
                "status": "unhealthy",
                "service": SERVICE_NAME,
                "error": "Service not initialized"
            })),
        }
    }

    /// Get metrics as Prometheus text format
    pub async fn get_metrics_text(metrics_collector: Arc<MetricsCollector>) -> Result<String> {
        let metric_families = metrics_collector.registry().gather();
        let encoder = TextEncoder::new();

        encoder
            .encode_to_string(&metric_families)
            .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaManager;
    use crate::types::OpponentPreference;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tokio::sync::RwLock;
    use tower::ServiceExt; // for oneshot

    fn server_with_probe(running: bool) -> (HealthServer, Arc<ArenaManager>) {
        let collector = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        let arena = Arc::new(ArenaManager::with_metrics(
            vec![3, 4],
            Some(5),
            collector.clone(),
        ));
        let probe = ServiceProbe::new(
            "tictac-room",
            arena.clone(),
            Arc::new(RwLock::new(running)),
        );
        let server = HealthServer::new(HealthServerConfig::default(), collector).with_probe(probe);
        (server, arena)
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let collector = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        let server = HealthServer::new(HealthServerConfig::default(), collector);

        let response = get(server.create_router(), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (server, arena) = server_with_probe(true);
        arena
            .request_match(7, 3, OpponentPreference::Human)
            .unwrap();

        let response = get(server.create_router(), "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("tictac_room_queue_joins_total"));
    }

    #[tokio::test]
    async fn test_endpoints_without_probe() {
        let collector = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        let server = HealthServer::new(HealthServerConfig::default(), collector);
        let app = server.create_router();

        for uri in ["/health", "/ready", "/alive", "/stats"] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_endpoints_with_running_service() {
        let (server, arena) = server_with_probe(true);
        arena
            .request_match(1, 3, OpponentPreference::Bot { symbol: crate::types::Symbol::X })
            .unwrap();
        let app = server.create_router();

        for uri in ["/health", "/ready", "/alive"] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }

        let response = get(app, "/stats").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats["sessions"]["active"], 1);
        assert_eq!(stats["sessions"]["created"], 1);
    }

    #[tokio::test]
    async fn test_stopped_service_reports_unavailable() {
        let (server, _arena) = server_with_probe(false);
        let app = server.create_router();

        let response = get(app.clone(), "/health").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = get(app, "/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_404_handling() {
        let collector = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        let server = HealthServer::new(HealthServerConfig::default(), collector);

        let response = get(server.create_router(), "/nonexistent").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_endpoints_compatibility() {
        let collector = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        collector.update_health_status(2);

        let health_status = HealthEndpoints::get_health_status(None).await.unwrap();
        assert_eq!(health_status["status"], "unhealthy");

        let metrics_text = HealthEndpoints::get_metrics_text(collector).await.unwrap();
        assert!(metrics_text.contains("tictac_room"));
    }
}
