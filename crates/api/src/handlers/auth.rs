//! Registration and login

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::models::{UserBody, UserRow};
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    id: i64,
    email: String,
    username: String,
}

/// POST /api/v1/users
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }
    if !validation::is_valid_email(&email) {
        return Err(ApiError::validation("invalid email format"));
    }

    let password_hash = state
        .hasher
        .hash_password(&body.password)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    // The email doubles as the initial username; both columns are UNIQUE.
    let username = email.clone();
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .execute(&state.pool)
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) if db::is_unique_violation(&e) => {
            return Err(ApiError::conflict("email already in use"));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(email, "registered new user");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: result.last_insert_rowid(),
            email,
            username,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
    user: UserBody,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }
    if !validation::is_valid_email(&email) {
        return Err(ApiError::validation("invalid email format"));
    }

    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized_with("invalid email or password"))?;

    let verified = state
        .hasher
        .verify_password(&body.password, &user.password_hash)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !verified {
        return Err(ApiError::unauthorized_with("invalid email or password"));
    }

    let token = cortado_auth::issue_token(
        user.id,
        &user.email,
        &user.username,
        &state.config.jwt.secret,
        state.config.jwt.expiry_secs,
    )
    .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
