//! Brew session logs
//!
//! Logs belong to the user who brewed and reference one of their own
//! coffees. Listing another user's logs is public; everything else is
//! owner-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use sqlx::QueryBuilder;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, CurrentUser};
use crate::models::{BrewLogBody, BrewLogRow};
use crate::validation::non_blank;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewLogListEnvelope {
    brew_logs: Vec<BrewLogBody>,
}

fn check_range_f64(value: Option<f64>, field: &str, min: f64, max: f64) -> ApiResult<()> {
    if let Some(value) = value {
        if !(min..=max).contains(&value) {
            return Err(ApiError::validation(format!(
                "{field} must be between {min} and {max}"
            )));
        }
    }
    Ok(())
}

fn check_range_i64(value: Option<i64>, field: &str, min: i64, max: i64) -> ApiResult<()> {
    if let Some(value) = value {
        if !(min..=max).contains(&value) {
            return Err(ApiError::validation(format!(
                "{field} must be between {min} and {max}"
            )));
        }
    }
    Ok(())
}

fn validate_measurements(
    coffee_weight: Option<f64>,
    water_weight: Option<f64>,
    water_temperature: Option<f64>,
    brew_time: Option<i64>,
    rating: Option<i64>,
) -> ApiResult<()> {
    check_range_f64(coffee_weight, "coffeeWeight", 0.0, 200.0)?;
    check_range_f64(water_weight, "waterWeight", 0.0, 3000.0)?;
    check_range_f64(water_temperature, "waterTemperature", 0.0, 100.0)?;
    check_range_i64(brew_time, "brewTime", 0, 3600)?;
    check_range_i64(rating, "rating", 1, 5)?;
    Ok(())
}

async fn fetch_owned(state: &AppState, id: i64, user_id: i64) -> ApiResult<BrewLogRow> {
    sqlx::query_as::<_, BrewLogRow>("SELECT * FROM brew_logs WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("brew log"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBrewLogRequest {
    coffee_id: i64,
    brew_method: String,
    coffee_weight: Option<f64>,
    water_weight: Option<f64>,
    grind_size: Option<String>,
    water_temperature: Option<f64>,
    brew_time: Option<i64>,
    tasting_notes: Option<String>,
    rating: Option<i64>,
}

/// POST /api/v1/brewlogs
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(body): ApiJson<CreateBrewLogRequest>,
) -> ApiResult<(StatusCode, Json<BrewLogBody>)> {
    if body.coffee_id <= 0 {
        return Err(ApiError::validation("coffeeId is required"));
    }
    let brew_method = body.brew_method.trim().to_string();
    if brew_method.is_empty() {
        return Err(ApiError::validation("brewMethod is required"));
    }
    validate_measurements(
        body.coffee_weight,
        body.water_weight,
        body.water_temperature,
        body.brew_time,
        body.rating,
    )?;

    // The coffee must exist and be the caller's own.
    let owner_id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM coffees WHERE id = ?1")
        .bind(body.coffee_id)
        .fetch_optional(&state.pool)
        .await?;
    let owner_id = owner_id.ok_or(ApiError::NotFound("coffee"))?;
    if owner_id != user.id {
        return Err(ApiError::forbidden("coffee not owned by user"));
    }

    let grind_size = body.grind_size.as_deref().and_then(non_blank);
    let tasting_notes = body.tasting_notes.as_deref().and_then(non_blank);

    let result = sqlx::query(
        "INSERT INTO brew_logs (user_id, coffee_id, brew_method, coffee_weight, water_weight, \
         grind_size, water_temperature, brew_time, tasting_notes, rating) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(user.id)
    .bind(body.coffee_id)
    .bind(&brew_method)
    .bind(body.coffee_weight)
    .bind(body.water_weight)
    .bind(&grind_size)
    .bind(body.water_temperature)
    .bind(body.brew_time)
    .bind(&tasting_notes)
    .bind(body.rating)
    .execute(&state.pool)
    .await?;

    let row = fetch_owned(&state, result.last_insert_rowid(), user.id).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/brewlogs
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<BrewLogListEnvelope>> {
    list_for_user(&state, user.id).await
}

/// GET /api/v1/users/:user_id/brewlogs (public)
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<BrewLogListEnvelope>> {
    list_for_user(&state, user_id).await
}

async fn list_for_user(state: &AppState, user_id: i64) -> ApiResult<Json<BrewLogListEnvelope>> {
    let rows = sqlx::query_as::<_, BrewLogRow>(
        "SELECT * FROM brew_logs WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(BrewLogListEnvelope {
        brew_logs: rows.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/brewlogs/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BrewLogBody>> {
    let row = fetch_owned(&state, id, user.id).await?;
    Ok(Json(row.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBrewLogRequest {
    brew_method: Option<String>,
    coffee_weight: Option<f64>,
    water_weight: Option<f64>,
    grind_size: Option<String>,
    water_temperature: Option<f64>,
    brew_time: Option<i64>,
    tasting_notes: Option<String>,
    rating: Option<i64>,
}

impl UpdateBrewLogRequest {
    fn is_empty(&self) -> bool {
        self.brew_method.is_none()
            && self.coffee_weight.is_none()
            && self.water_weight.is_none()
            && self.grind_size.is_none()
            && self.water_temperature.is_none()
            && self.brew_time.is_none()
            && self.tasting_notes.is_none()
            && self.rating.is_none()
    }
}

/// PUT /api/v1/brewlogs/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateBrewLogRequest>,
) -> ApiResult<Json<BrewLogBody>> {
    if body.is_empty() {
        return Err(ApiError::validation("at least one field must be provided"));
    }

    fetch_owned(&state, id, user.id).await?;

    let brew_method = body.brew_method.as_deref().map(str::trim).map(str::to_string);
    if let Some(brew_method) = &brew_method {
        if brew_method.is_empty() {
            return Err(ApiError::validation("brewMethod is required"));
        }
    }
    validate_measurements(
        body.coffee_weight,
        body.water_weight,
        body.water_temperature,
        body.brew_time,
        body.rating,
    )?;

    let mut builder = QueryBuilder::new("UPDATE brew_logs SET ");
    let mut fields = builder.separated(", ");
    if let Some(brew_method) = brew_method {
        fields.push("brew_method = ");
        fields.push_bind_unseparated(brew_method);
    }
    if let Some(coffee_weight) = body.coffee_weight {
        fields.push("coffee_weight = ");
        fields.push_bind_unseparated(coffee_weight);
    }
    if let Some(water_weight) = body.water_weight {
        fields.push("water_weight = ");
        fields.push_bind_unseparated(water_weight);
    }
    if let Some(grind_size) = body.grind_size.as_deref() {
        fields.push("grind_size = ");
        fields.push_bind_unseparated(non_blank(grind_size));
    }
    if let Some(water_temperature) = body.water_temperature {
        fields.push("water_temperature = ");
        fields.push_bind_unseparated(water_temperature);
    }
    if let Some(brew_time) = body.brew_time {
        fields.push("brew_time = ");
        fields.push_bind_unseparated(brew_time);
    }
    if let Some(tasting_notes) = body.tasting_notes.as_deref() {
        fields.push("tasting_notes = ");
        fields.push_bind_unseparated(non_blank(tasting_notes));
    }
    if let Some(rating) = body.rating {
        fields.push("rating = ");
        fields.push_bind_unseparated(rating);
    }
    fields.push("updated_at = CURRENT_TIMESTAMP");
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND user_id = ");
    builder.push_bind(user.id);
    builder.build().execute(&state.pool).await?;

    let row = fetch_owned(&state, id, user.id).await?;
    Ok(Json(row.into()))
}

/// DELETE /api/v1/brewlogs/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM brew_logs WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("brew log"));
    }
    Ok(StatusCode::NO_CONTENT)
}
