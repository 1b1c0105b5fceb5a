// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP API server
//!
//! Two routes: `GET /analyze` streams progress events over SSE, and
//! `GET /health` reports provider availability for external probes.
//! Validation and rate limiting reject before any streaming begins.

use axum::{
    extract::{ConnectInfo, Query as HttpQuery, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::progress::ProgressSender;
use crate::api::rate_limiter::{RateLimiter, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS};
use crate::cache::ResultCache;
use crate::pipeline::Pipeline;
use crate::query::Query;

/// Capacity of each request's progress channel
const PROGRESS_BUFFER: usize = 32;

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen port
    pub port: u16,
    /// Admits per client per rate-limit window
    pub rate_limit_max_requests: usize,
    /// Rate-limit window in seconds
    pub rate_limit_window_secs: u64,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_REQUESTS),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_WINDOW_SECS),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            rate_limit_max_requests: DEFAULT_MAX_REQUESTS,
            rate_limit_window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

/// Health probe response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// healthy, degraded, or unhealthy
    pub status: String,
    /// Per-provider availability flags
    #[serde(flatten)]
    pub providers: BTreeMap<String, bool>,
    /// Current result-cache entry count
    pub cache_size: usize,
    /// Clients currently tracked by the rate limiter
    pub tracked_clients: usize,
}

/// Shared server state, created once at startup
///
/// Owns the pipeline and the cross-request mutable state (cache handle,
/// rate limiter); everything is torn down with the process.
pub struct AppState {
    pipeline: Arc<Pipeline>,
    cache: Arc<ResultCache>,
    rate_limiter: RateLimiter,
}

impl AppState {
    /// Create the server state
    pub fn new(pipeline: Arc<Pipeline>, cache: Arc<ResultCache>, config: &ApiConfig) -> Self {
        Self {
            pipeline,
            cache,
            rate_limiter: RateLimiter::new(
                config.rate_limit_max_requests,
                Duration::from_secs(config.rate_limit_window_secs),
            ),
        }
    }

    /// Build the health probe response
    pub async fn health(&self) -> HealthResponse {
        let mut providers = BTreeMap::new();
        for (name, available) in self.pipeline.search_status() {
            providers.insert(name.to_string(), available);
        }
        for (name, available) in self.pipeline.ai_status() {
            providers.insert(name.to_string(), available);
        }

        let status = if !self.pipeline.any_ai_available() {
            "unhealthy"
        } else if providers.values().all(|v| *v) {
            "healthy"
        } else {
            "degraded"
        };

        HealthResponse {
            status: status.to_string(),
            providers,
            cache_size: self.cache.len(),
            tracked_clients: self.rate_limiter.tracked_clients().await,
        }
    }
}

/// Build the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", get(analyze_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    product: String,
}

/// `GET /analyze?product=<name>`
///
/// Rejected input and rate-limited clients get an immediate JSON error
/// response; everything else becomes an SSE stream fed by a spawned
/// pipeline task.
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    HttpQuery(params): HttpQuery<AnalyzeParams>,
) -> Response {
    let query = match Query::parse(&params.product) {
        Ok(query) => query,
        Err(e) => {
            warn!("Rejected product name: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let client_id = addr.ip().to_string();
    if !state.rate_limiter.admit(&client_id).await {
        warn!("Rate limited client {}", client_id);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests" })),
        )
            .into_response();
    }

    let (progress, rx) = ProgressSender::channel(PROGRESS_BUFFER);
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        pipeline.run(query, progress).await;
    });

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(&event));

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(10)))
        .into_response()
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.health().await)
}
