//! Home and health handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use utoipa::ToSchema;

use super::routes::AppState;

// Response types

#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    /// Welcome message
    pub message: String,
    /// API version
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "Healthy" when the process answers
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started
    pub uptime_secs: u64,
    pub version: String,
    /// Deployment environment name
    pub environment: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// "Ready" or "Not Ready"
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedHealthResponse {
    /// "Healthy", or "Degraded" when the backend is unreachable
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
    pub version: String,
    pub environment: String,
    /// Time spent checking the backend
    pub response_time_ms: f64,
    pub backends: Backends,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Backends {
    pub appserver: BackendStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackendStatus {
    /// "Healthy" or "Unhealthy"
    pub status: String,
    pub version: Option<String>,
    pub models_count: Option<usize>,
    pub models_up: Option<usize>,
    pub error: Option<String>,
}

impl BackendStatus {
    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

async fn check_appserver(state: &AppState) -> BackendStatus {
    match state.appserver.about().await {
        Ok(about) => BackendStatus {
            status: "Healthy".into(),
            version: Some(about.app_server_version.clone()),
            models_count: Some(about.models.len()),
            models_up: Some(about.models_up()),
            error: None,
        },
        Err(e) => {
            tracing::warn!("Appserver health check failed: {}", e);
            BackendStatus {
                status: "Unhealthy".into(),
                version: None,
                models_count: None,
                models_up: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

// Handlers

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = RootResponse)
    ),
    tag = "home"
)]
pub async fn root() -> Json<RootResponse> {
    tracing::info!("Root endpoint accessed");
    Json(RootResponse {
        message: "Welcome to Appserver MCP API".into(),
        version: version(),
        timestamp: Utc::now(),
    })
}

/// Basic health check; does not contact the backend
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    tracing::info!("Health check requested - Status: Healthy");
    Json(HealthResponse {
        status: "Healthy".into(),
        timestamp: Utc::now(),
        uptime_secs: state.uptime().as_secs(),
        version: version(),
        environment: state.environment.clone(),
    })
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health/live",
    responses(
        (status = 200, description = "Process is alive", body = LivenessResponse)
    ),
    tag = "health"
)]
pub async fn live() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "Alive".into(),
        timestamp: Utc::now(),
    })
}

/// Readiness probe; ready only when the Appserver answers `/about`
#[utoipa::path(
    get,
    path = "/api/health/ready",
    responses(
        (status = 200, description = "Backend reachable", body = ReadinessResponse),
        (status = 503, description = "Backend not reachable", body = ReadinessResponse)
    ),
    tag = "health"
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let backend = check_appserver(&state).await;

    if backend.is_healthy() {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "Ready".into(),
                timestamp: Utc::now(),
                reason: None,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "Not Ready".into(),
                timestamp: Utc::now(),
                reason: Some("Backend Appserver not accessible".into()),
            }),
        )
    }
}

/// Health including Appserver connectivity and model counts
#[utoipa::path(
    get,
    path = "/api/health/detailed",
    responses(
        (status = 200, description = "Service and backend healthy", body = DetailedHealthResponse),
        (status = 503, description = "Backend degraded", body = DetailedHealthResponse)
    ),
    tag = "health"
)]
pub async fn detailed(State(state): State<AppState>) -> (StatusCode, Json<DetailedHealthResponse>) {
    let started = Instant::now();
    let backend = check_appserver(&state).await;
    let response_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    let (code, status) = if backend.is_healthy() {
        (StatusCode::OK, "Healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Degraded")
    };

    tracing::info!(
        "Detailed health check completed - Status: {}, Backend: {}",
        status,
        backend.status
    );

    (
        code,
        Json(DetailedHealthResponse {
            status: status.into(),
            timestamp: Utc::now(),
            uptime_secs: state.uptime().as_secs(),
            version: version(),
            environment: state.environment.clone(),
            response_time_ms,
            backends: Backends { appserver: backend },
        }),
    )
}
