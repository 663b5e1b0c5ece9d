//! User-owned coffees
//!
//! Every query is scoped to the authenticated user; another user's coffee is
//! indistinguishable from a missing one (404).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use sqlx::QueryBuilder;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, CurrentUser};
use crate::models::{CoffeeBody, CoffeeRow};
use crate::validation::non_blank;
use crate::AppState;

const NAME_MAX: usize = 255;
const ORIGIN_MAX: usize = 100;
const ROASTER_MAX: usize = 255;
const PHOTO_PATH_MAX: usize = 500;

#[derive(Debug, Serialize)]
pub struct CoffeeEnvelope {
    coffee: CoffeeBody,
}

#[derive(Debug, Serialize)]
pub struct CoffeeListEnvelope {
    coffees: Vec<CoffeeBody>,
}

async fn fetch_owned(state: &AppState, id: i64, user_id: i64) -> ApiResult<CoffeeRow> {
    sqlx::query_as::<_, CoffeeRow>("SELECT * FROM coffees WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("coffee"))
}

fn check_limit(value: &Option<String>, field: &str, max: usize) -> ApiResult<()> {
    if let Some(value) = value {
        if value.chars().count() > max {
            return Err(ApiError::validation(format!(
                "{field} must be <= {max} characters"
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCoffeeRequest {
    name: String,
    origin: Option<String>,
    roaster: Option<String>,
    description: Option<String>,
    photo_path: Option<String>,
}

/// POST /api/v1/coffees
///
/// Find-or-create on (user, name, origin, roaster): logging the same bag
/// twice converges on one record, refreshing its photo when a new one is
/// provided.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<CreateCoffeeRequest>,
) -> ApiResult<(StatusCode, Json<CoffeeEnvelope>)> {
    let name = body.name.trim().to_string();
    if name.is_empty() || name.chars().count() > NAME_MAX {
        return Err(ApiError::validation(format!(
            "name is required and must be <= {NAME_MAX} characters"
        )));
    }

    let origin = body.origin.as_deref().and_then(non_blank);
    let roaster = body.roaster.as_deref().and_then(non_blank);
    let description = body.description.as_deref().and_then(non_blank);
    let photo_path = body.photo_path.as_deref().and_then(non_blank);
    check_limit(&origin, "origin", ORIGIN_MAX)?;
    check_limit(&roaster, "roaster", ROASTER_MAX)?;
    check_limit(&photo_path, "photoPath", PHOTO_PATH_MAX)?;

    let mut tx = state.pool.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM coffees \
         WHERE user_id = ?1 AND name = ?2 \
           AND IFNULL(origin, '') = ?3 AND IFNULL(roaster, '') = ?4",
    )
    .bind(user.id)
    .bind(&name)
    .bind(origin.as_deref().unwrap_or(""))
    .bind(roaster.as_deref().unwrap_or(""))
    .fetch_optional(&mut *tx)
    .await?;

    let coffee_id = match existing {
        Some(id) => {
            if let Some(photo_path) = &photo_path {
                sqlx::query(
                    "UPDATE coffees SET photo_path = ?1, updated_at = CURRENT_TIMESTAMP \
                     WHERE id = ?2 AND user_id = ?3",
                )
                .bind(photo_path)
                .bind(id)
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
            }
            id
        }
        None => {
            let result = sqlx::query(
                "INSERT INTO coffees (user_id, name, origin, roaster, description, photo_path) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(user.id)
            .bind(&name)
            .bind(&origin)
            .bind(&roaster)
            .bind(&description)
            .bind(&photo_path)
            .execute(&mut *tx)
            .await?;
            result.last_insert_rowid()
        }
    };

    tx.commit().await?;

    let row = fetch_owned(&state, coffee_id, user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(CoffeeEnvelope { coffee: row.into() }),
    ))
}

/// GET /api/v1/coffees
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<CoffeeListEnvelope>> {
    let rows = sqlx::query_as::<_, CoffeeRow>(
        "SELECT * FROM coffees WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(CoffeeListEnvelope {
        coffees: rows.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/coffees/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CoffeeEnvelope>> {
    let row = fetch_owned(&state, id, user.id).await?;
    Ok(Json(CoffeeEnvelope { coffee: row.into() }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCoffeeRequest {
    name: Option<String>,
    origin: Option<String>,
    roaster: Option<String>,
    description: Option<String>,
    photo_path: Option<String>,
}

/// PUT /api/v1/coffees/:id
///
/// Partial update; blanking an optional field clears it.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateCoffeeRequest>,
) -> ApiResult<Json<CoffeeEnvelope>> {
    if body.name.is_none()
        && body.origin.is_none()
        && body.roaster.is_none()
        && body.description.is_none()
        && body.photo_path.is_none()
    {
        return Err(ApiError::validation("at least one field must be provided"));
    }

    // Ownership first, so an empty update on a foreign coffee is still a 404.
    fetch_owned(&state, id, user.id).await?;

    let name = body.name.as_deref().map(str::trim).map(str::to_string);
    if let Some(name) = &name {
        if name.is_empty() || name.chars().count() > NAME_MAX {
            return Err(ApiError::validation(format!(
                "name is required and must be <= {NAME_MAX} characters"
            )));
        }
    }
    let origin = body.origin.as_deref().map(|v| non_blank(v));
    let roaster = body.roaster.as_deref().map(|v| non_blank(v));
    let description = body.description.as_deref().map(|v| non_blank(v));
    let photo_path = body.photo_path.as_deref().map(|v| non_blank(v));
    check_limit(&origin.clone().flatten(), "origin", ORIGIN_MAX)?;
    check_limit(&roaster.clone().flatten(), "roaster", ROASTER_MAX)?;
    check_limit(&photo_path.clone().flatten(), "photoPath", PHOTO_PATH_MAX)?;

    let mut builder = QueryBuilder::new("UPDATE coffees SET ");
    let mut fields = builder.separated(", ");
    if let Some(name) = name {
        fields.push("name = ");
        fields.push_bind_unseparated(name);
    }
    if let Some(origin) = origin {
        fields.push("origin = ");
        fields.push_bind_unseparated(origin);
    }
    if let Some(roaster) = roaster {
        fields.push("roaster = ");
        fields.push_bind_unseparated(roaster);
    }
    if let Some(description) = description {
        fields.push("description = ");
        fields.push_bind_unseparated(description);
    }
    if let Some(photo_path) = photo_path {
        fields.push("photo_path = ");
        fields.push_bind_unseparated(photo_path);
    }
    fields.push("updated_at = CURRENT_TIMESTAMP");
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND user_id = ");
    builder.push_bind(user.id);
    builder.build().execute(&state.pool).await?;

    let row = fetch_owned(&state, id, user.id).await?;
    Ok(Json(CoffeeEnvelope { coffee: row.into() }))
}

/// DELETE /api/v1/coffees/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM coffees WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("coffee"));
    }
    Ok(StatusCode::NO_CONTENT)
}
