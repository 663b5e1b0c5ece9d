//! REST API for the cortado brewing journal
//!
//! Builds the axum router for the `/api/v1` surface: registration and login,
//! profile management, user-owned coffees and brew logs, and the rule-based
//! brewing recommendation endpoint.

pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod recommend;
pub mod validation;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use cortado_auth::Argon2Hasher;
use cortado_core::{AppConfig, Environment};

pub use error::{ApiError, ApiResult};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub hasher: Arc<Argon2Hasher>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        let hasher = if config.environment == Environment::Production {
            Argon2Hasher::production()
        } else {
            Argon2Hasher::development()
        };
        Self {
            pool,
            config: Arc::new(config),
            hasher: Arc::new(hasher),
        }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/users", post(handlers::auth::register))
        .route(
            "/users/:user_id/brewlogs",
            get(handlers::brewlogs::list_by_user),
        );

    let protected = Router::new()
        .route(
            "/users/me",
            get(handlers::users::profile)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
        .route(
            "/coffees",
            get(handlers::coffees::list).post(handlers::coffees::create),
        )
        .route(
            "/coffees/:id",
            get(handlers::coffees::get)
                .put(handlers::coffees::update)
                .delete(handlers::coffees::delete),
        )
        .route(
            "/brewlogs",
            get(handlers::brewlogs::list).post(handlers::brewlogs::create),
        )
        .route(
            "/brewlogs/:id",
            get(handlers::brewlogs::get)
                .put(handlers::brewlogs::update)
                .delete(handlers::brewlogs::delete),
        )
        .route("/ai/recommendation", post(handlers::ai::recommendation))
        .route("/ai/extract-coffee", post(handlers::ai::extract_coffee))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health::check))
        .nest("/api/v1", public.merge(protected))
        .layer(middleware::cors_layer(&state.config.server.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
