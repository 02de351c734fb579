//! # SSBJ HTTP API Module
//!
//! This module implements the JSON API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (no key, no user)
//! - `GET /catalog` - Criteria, assurance checklist and maturity scale
//! - `GET /users`, `POST /users` - User registry (admin only)
//! - `GET /assessments`, `POST /assessments` - List visible / create draft
//! - `GET /assessments/{id}` - One assessment with its scores
//! - `PUT /assessments/{id}/scores/{code}` - Record a criterion score
//! - `POST /assessments/{id}/complete` - Complete a draft
//! - `GET /assessments/{id}/report` - Pillar, category and gap report
//! - `POST /assessments/{id}/review` - Start the review
//! - `GET /assessments/{id}/review` - The review of an assessment
//! - `GET /reviews/{id}` - One review
//! - `PUT /reviews/{id}/items/{code}` - Rate a checklist item
//! - `POST /reviews/{id}/submit` - Submit with opinion, findings, recommendations
//! - `GET /reviews/{id}/report` - Checklist report
//! - `GET /dashboard` - Role-scoped statistics
//!
//! ## Identity
//!
//! Every endpoint but `/health` needs an `X-SSBJ-User` header naming a
//! registered user, plus the API key when one is configured.
//!
//! Malformed bodies and path parameters are rejected with the same
//! `ErrorResponse` shape as core errors (`invalid_input`, 400).

mod auth;
mod extract;
mod handlers;
mod middleware;
mod types;

pub use auth::{CurrentActor, USER_HEADER};
pub use extract::{ApiJson, ApiPath};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    ApiError, AssessmentReportResponse, AssessmentResponse, AssessmentSummaryJson,
    AssuranceItemJson, CatalogResponse, CategoryJson, ChecklistJson, CriterionJson,
    DashboardResponse, ErrorResponse, GapJson, HealthResponse, ItemRequest, MaturityLevelJson,
    OpinionCountsJson, PercentageJson, PillarAverageJson, PillarJson, ReviewReportResponse,
    ReviewResponse, ReviewSummaryJson, ScoreJson, ScoreRequest, StatusCountsJson, UserResponse,
    status_for,
};

use crate::config::ServerConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use ssbj_core::{SsbjError, Workspace};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the workspace and the settings it was started with.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<RwLock<Workspace>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(workspace: Workspace, config: ServerConfig) -> Self {
        Self {
            workspace: Arc::new(RwLock::new(workspace)),
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];

/// Build the CORS layer from `ServerConfig::cors_origins`.
///
/// - `["*"]`: allows all origins (development only)
/// - unset: localhost only
/// - otherwise: the listed origins; if none parse, localhost only
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let allow_headers = [header::CONTENT_TYPE, header::AUTHORIZATION, USER_HEADER];

    match config.cors_origins.as_deref() {
        Some([wildcard]) if wildcard == "*" => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|s| match s.trim().parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(CORS_METHODS)
                    .allow_headers(allow_headers)
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, USER_HEADER])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting - if enabled
/// 5. API key authentication - if configured
///
/// User identity is resolved per handler by the `CurrentActor` extractor.
pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let cors = build_cors_layer(&config);

    let rate_limiter = if config.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", config.rate_limit);
        Some(create_rate_limiter(config.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - any caller may assert a user identity. \
             Set SSBJ_API_KEY or api_key in ssbj.toml to enable it."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/catalog", get(handlers::catalog_handler))
        .route(
            "/users",
            get(handlers::list_users_handler).post(handlers::create_user_handler),
        )
        .route(
            "/assessments",
            get(handlers::list_assessments_handler).post(handlers::create_assessment_handler),
        )
        .route("/assessments/{id}", get(handlers::get_assessment_handler))
        .route(
            "/assessments/{id}/scores/{code}",
            put(handlers::record_score_handler),
        )
        .route(
            "/assessments/{id}/complete",
            post(handlers::complete_assessment_handler),
        )
        .route(
            "/assessments/{id}/report",
            get(handlers::assessment_report_handler),
        )
        .route(
            "/assessments/{id}/review",
            get(handlers::assessment_review_handler).post(handlers::start_review_handler),
        )
        .route("/reviews/{id}", get(handlers::get_review_handler))
        .route(
            "/reviews/{id}/items/{code}",
            put(handlers::rate_item_handler),
        )
        .route("/reviews/{id}/submit", post(handlers::submit_review_handler))
        .route("/reviews/{id}/report", get(handlers::review_report_handler))
        .route("/dashboard", get(handlers::dashboard_handler));

    if config.api_key.is_some() {
        router = router.layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::api_key_auth_middleware,
        ));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server on `config.bind_address()` and run until Ctrl+C.
pub async fn run_server(workspace: Workspace, config: ServerConfig) -> Result<(), SsbjError> {
    let addr = config.bind_address();
    let state = AppState::new(workspace, config);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SsbjError::IoError(format!("Bind failed on {}: {}", addr, e)))?;

    tracing::info!("SSBJ readiness server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SsbjError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
