//! Database rows and their JSON bodies
//!
//! Rows mirror the migration schema; bodies are the camelCase wire shapes.
//! Timestamps are stored as SQLite datetimes (UTC) and rendered as RFC 3339.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Render a stored UTC timestamp as RFC 3339.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRow> for UserBody {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: format_timestamp(row.created_at),
            updated_at: format_timestamp(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CoffeeRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub origin: Option<String>,
    pub roaster: Option<String>,
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeBody {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roaster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CoffeeRow> for CoffeeBody {
    fn from(row: CoffeeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            origin: row.origin,
            roaster: row.roaster,
            description: row.description,
            photo_path: row.photo_path,
            created_at: format_timestamp(row.created_at),
            updated_at: format_timestamp(row.updated_at),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BrewLogRow {
    pub id: i64,
    pub user_id: i64,
    pub coffee_id: i64,
    pub brew_method: String,
    pub coffee_weight: Option<f64>,
    pub water_weight: Option<f64>,
    pub grind_size: Option<String>,
    pub water_temperature: Option<f64>,
    pub brew_time: Option<i64>,
    pub tasting_notes: Option<String>,
    pub rating: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewLogBody {
    pub id: i64,
    pub user_id: i64,
    pub coffee_id: i64,
    pub brew_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coffee_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grind_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brew_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasting_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BrewLogRow> for BrewLogBody {
    fn from(row: BrewLogRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            coffee_id: row.coffee_id,
            brew_method: row.brew_method,
            coffee_weight: row.coffee_weight,
            water_weight: row.water_weight,
            grind_size: row.grind_size,
            water_temperature: row.water_temperature,
            brew_time: row.brew_time,
            tasting_notes: row.tasting_notes,
            rating: row.rating,
            created_at: format_timestamp(row.created_at),
            updated_at: format_timestamp(row.updated_at),
        }
    }
}
