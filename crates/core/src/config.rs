//! Application configuration
//!
//! Loads typed configuration from environment variables with sensible
//! development defaults, and validates it before the app starts.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Default JWT secret for development. `validate()` rejects it in production.
pub const DEV_JWT_SECRET: &str = "cortado-dev-secret-change-me";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: '{value}' (expected {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("configuration validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                field: "APP_ENV".to_string(),
                value: s.to_string(),
                expected: "development, testing, or production".to_string(),
            }),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub migrations_path: PathBuf,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = get_env_or_default("APP_ENV", "development");
        let environment = Environment::from_str(&environment)?;

        let server = ServerConfig {
            host: get_env_or_default("HOST", "0.0.0.0"),
            port: get_env_parsed("PORT", 8080)?,
            allowed_origins: get_env_list("ALLOWED_ORIGINS", &["http://localhost:3000"]),
        };

        let database = DatabaseConfig {
            url: get_env_or_default("DATABASE_URL", "sqlite://data/cortado.db"),
            migrations_path: PathBuf::from(get_env_or_default(
                "DATABASE_MIGRATIONS_PATH",
                "./migrations",
            )),
        };

        let jwt = JwtConfig {
            secret: get_env_or_default("JWT_SECRET", DEV_JWT_SECRET),
            expiry_secs: get_env_parsed("JWT_EXPIRY_SECS", 86_400)?,
        };

        let config = AppConfig {
            environment,
            server,
            database,
            jwt,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "DATABASE_URL".to_string(),
                reason: "database URL cannot be empty".to_string(),
            });
        }

        if self.jwt.secret.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "JWT_SECRET".to_string(),
                reason: "JWT secret cannot be empty".to_string(),
            });
        }

        if self.environment == Environment::Production && self.jwt.secret == DEV_JWT_SECRET {
            return Err(ConfigError::ValidationFailed {
                field: "JWT_SECRET".to_string(),
                reason: "the development JWT secret is not allowed in production".to_string(),
            });
        }

        if self.jwt.expiry_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "JWT_EXPIRY_SECS".to_string(),
                reason: "token expiry must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Socket address the server should bind to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "HOST".to_string(),
                value: self.server.host.clone(),
                expected: "an IP address".to_string(),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn get_env_parsed<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => {
            value.parse().map_err(|_| ConfigError::InvalidValue {
                field: key.to_string(),
                value,
                expected: std::any::type_name::<T>().to_string(),
            })
        }
        _ => Ok(default),
    }
}

fn get_env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite://data/cortado.db".to_string(),
                migrations_path: PathBuf::from("./migrations"),
            },
            jwt: JwtConfig {
                secret: DEV_JWT_SECRET.to_string(),
                expiry_secs: 86_400,
            },
        }
    }

    #[test]
    fn environment_parses_aliases() {
        assert_eq!(Environment::from_str("dev").unwrap(), Environment::Development);
        assert_eq!(Environment::from_str("TEST").unwrap(), Environment::Testing);
        assert_eq!(Environment::from_str("prod").unwrap(), Environment::Production);
        assert!(Environment::from_str("staging").is_err());
    }

    #[test]
    fn dev_secret_allowed_in_development() {
        let config = base_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn dev_secret_rejected_in_production() {
        let mut config = base_config();
        config.environment = Environment::Production;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn zero_expiry_rejected() {
        let mut config = base_config();
        config.jwt.expiry_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bind_addr_parses_host_and_port() {
        let config = base_config();
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn bind_addr_rejects_bad_host() {
        let mut config = base_config();
        config.server.host = "not-an-ip".to_string();
        assert!(config.bind_addr().is_err());
    }
}
