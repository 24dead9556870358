//! API route definitions

use axum::{body::Body, http::Request, routing::get, Router};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    self, BackendStatus, Backends, DetailedHealthResponse, HealthResponse, LivenessResponse,
    ReadinessResponse, RootResponse,
};
use crate::mcp::AppserverServer;
use crate::service::{AngleService, AppserverService};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Appserver MCP API",
        version = "0.1.0",
        description = "MCP and HTTP gateway for the Appserver business-intelligence backend"
    ),
    tags(
        (name = "home", description = "Welcome endpoint"),
        (name = "health", description = "Health, liveness and readiness checks")
    ),
    paths(
        handlers::root,
        handlers::health,
        handlers::live,
        handlers::ready,
        handlers::detailed,
    ),
    components(schemas(
        RootResponse,
        HealthResponse,
        LivenessResponse,
        ReadinessResponse,
        DetailedHealthResponse,
        Backends,
        BackendStatus,
    ))
)]
pub struct ApiDoc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub appserver: Arc<AppserverService>,
    pub angles: Arc<AngleService>,
    pub environment: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        appserver: Arc<AppserverService>,
        angles: Arc<AngleService>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            appserver,
            angles,
            environment: environment.into(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

fn routes() -> Router<AppState> {
    Router::new()
        // Home
        .route("/", get(handlers::root))

        // Health
        .route("/api/health", get(handlers::health))
        .route("/api/health/live", get(handlers::live))
        .route("/api/health/ready", get(handlers::ready))
        .route("/api/health/detailed", get(handlers::detailed))

        // OpenAPI spec and Swagger UI
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
}

fn finish(router: Router<AppState>, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Short request id to correlate the request and response log lines
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let id = &uuid[..8];
        tracing::info_span!(
            "request",
            id = %id,
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    router.layer(cors).layer(trace).with_state(state)
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    finish(routes(), state)
}

/// Create the API router with MCP endpoint integrated
pub fn create_router_with_mcp(state: AppState, ct: CancellationToken) -> Router {
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpService, StreamableHttpServerConfig,
    };

    let appserver = state.appserver.clone();
    let angles = state.angles.clone();

    let config = StreamableHttpServerConfig {
        cancellation_token: ct,
        ..Default::default()
    };

    let mcp_service = StreamableHttpService::new(
        move || Ok(AppserverServer::new(appserver.clone(), angles.clone())),
        Arc::new(LocalSessionManager::default()),
        config,
    );

    finish(routes().nest_service("/mcp", mcp_service), state)
}
