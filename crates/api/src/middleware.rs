//! HTTP middleware
//!
//! Bearer-token authentication and CORS configuration.

use axum::extract::{Request, State};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::AppState;

/// Clock-skew tolerance applied when validating tokens at the HTTP boundary.
const TOKEN_LEEWAY_SECS: u64 = 60;

/// Reject the request unless it carries a valid `Authorization: Bearer`
/// token; on success a [`CurrentUser`] is attached for downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(ApiError::unauthorized)?;

    let claims = cortado_auth::validate_token(token, &state.config.jwt.secret, TOKEN_LEEWAY_SECS)
        .map_err(|_| ApiError::unauthorized())?;
    let user_id = claims
        .subject_id()
        .map_err(|_| ApiError::unauthorized())?;

    req.extensions_mut().insert(CurrentUser {
        id: user_id,
        email: claims.email,
        username: claims.username,
    });
    Ok(next.run(req).await)
}

/// CORS layer for the configured origins.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring unparseable allowed origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
