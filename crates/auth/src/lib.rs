//! Authentication primitives for the cortado backend
//!
//! HS256 JWT issuance and validation, plus Argon2id password hashing. The
//! HTTP layer owns header parsing and error mapping; this crate only deals
//! in tokens, claims, and hashes.

pub mod error;
pub mod jwt;
pub mod password;

pub use error::{AuthError, AuthResult};
pub use jwt::{issue_token, validate_token, Claims, TOKEN_ISSUER};
pub use password::Argon2Hasher;
