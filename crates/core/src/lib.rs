//! Core types for the cortado backend
//!
//! Configuration loaded from the environment, plus the JSON error envelope
//! shared by every API response.

pub mod config;
pub mod response;

pub use config::{AppConfig, ConfigError, DatabaseConfig, Environment, JwtConfig, ServerConfig};
pub use response::ErrorBody;
