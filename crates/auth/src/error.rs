//! Authentication error types

use thiserror::Error;

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("token has expired")]
    TokenExpired,

    #[error("cryptographic operation failed: {0}")]
    Crypto(String),
}

impl AuthError {
    pub fn token_invalid<T: Into<String>>(message: T) -> Self {
        AuthError::TokenInvalid(message.into())
    }

    pub fn crypto<T: Into<String>>(message: T) -> Self {
        AuthError::Crypto(message.into())
    }
}
