//! Profile management for the authenticated user

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use sqlx::QueryBuilder;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, CurrentUser};
use crate::models::{UserBody, UserRow};
use crate::validation;
use crate::AppState;

async fn fetch_user(state: &AppState, id: i64) -> ApiResult<UserRow> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("user"))
}

/// GET /api/v1/users/me
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<UserBody>> {
    let row = fetch_user(&state, user.id).await?;
    Ok(Json(row.into()))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    username: Option<String>,
    email: Option<String>,
}

/// PUT /api/v1/users/me
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserBody>> {
    if body.username.is_none() && body.email.is_none() {
        return Err(ApiError::validation("at least one field must be provided"));
    }

    if let Some(username) = &body.username {
        if !validation::is_valid_username(username) {
            return Err(ApiError::validation(
                "username must be 3-50 characters and contain only letters, numbers, \
                 underscores, and hyphens",
            ));
        }
    }

    let email = body.email.as_deref().map(|e| e.trim().to_lowercase());
    if let Some(email) = &email {
        if !validation::is_valid_email(email) {
            return Err(ApiError::validation("email format is invalid"));
        }

        let taken: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE email = ?1 AND id != ?2")
                .bind(email)
                .bind(user.id)
                .fetch_optional(&state.pool)
                .await?;
        if taken.is_some() {
            return Err(ApiError::conflict("email already in use"));
        }
    }

    let mut builder = QueryBuilder::new("UPDATE users SET ");
    let mut fields = builder.separated(", ");
    if let Some(username) = &body.username {
        fields.push("username = ");
        fields.push_bind_unseparated(username.clone());
    }
    if let Some(email) = &email {
        fields.push("email = ");
        fields.push_bind_unseparated(email.clone());
    }
    fields.push("updated_at = CURRENT_TIMESTAMP");
    builder.push(" WHERE id = ");
    builder.push_bind(user.id);
    if let Err(e) = builder.build().execute(&state.pool).await {
        if crate::db::is_unique_violation(&e) {
            return Err(ApiError::conflict("username or email already in use"));
        }
        return Err(e.into());
    }

    let row = fetch_user(&state, user.id).await?;
    Ok(Json(row.into()))
}

/// DELETE /api/v1/users/me
///
/// Coffees and brew logs cascade away with the account.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("user"));
    }

    tracing::info!(user_id = user.id, "deleted user account");
    Ok(StatusCode::NO_CONTENT)
}
