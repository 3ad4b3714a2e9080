//! HTTP API Layer
//!
//! REST API for the claims lifecycle system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: request handlers over the claims application service
//! - **Middleware**: bearer-token authentication and audit logging
//! - **DTOs**: request/response data transfer objects
//! - **Error Handling**: domain errors mapped onto HTTP statuses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service, Some(pool), config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_claims::ClaimService;

use crate::config::ApiConfig;
use crate::handlers::{claims, health};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ClaimService,
    /// Present when backed by PostgreSQL; `None` for in-memory deployments
    pub pool: Option<PgPool>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(service: ClaimService, pool: Option<PgPool>, config: ApiConfig) -> Self {
        Self {
            service,
            pool,
            config,
        }
    }
}

/// Creates the main API router
///
/// Claims routes are JWT-protected and audit-logged; health endpoints are
/// public. The static segments (`submit`, `log`, `comments`, ...) win over
/// the parameterized transition route, so `POST /:id/submit` dispatches on
/// the client configuration while `POST /:id/hr_approve` and friends name
/// their action explicitly.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::create_claim).get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/log", get(claims::get_status_log))
        .route("/:id/actions", get(claims::get_actions))
        .route("/:id/submit", post(claims::submit))
        .route(
            "/:id/comments",
            post(claims::add_comment).get(claims::list_comments),
        )
        .route(
            "/:id/attachments",
            post(claims::add_attachment).get(claims::list_attachments),
        )
        .route("/:id/:action", post(claims::transition));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
