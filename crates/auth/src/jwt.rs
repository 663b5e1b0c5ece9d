//! JWT issuance and validation
//!
//! Tokens are HS256 only; anything else is rejected outright. The subject
//! claim carries the numeric user id, duplicated in `user_id` for clients
//! that prefer a typed field.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Issuer written into every token.
pub const TOKEN_ISSUER: &str = "cortado";

/// Claims carried by a cortado access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    /// Numeric user id from the subject claim.
    pub fn subject_id(&self) -> AuthResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AuthError::token_invalid("subject claim is not a numeric user id"))
    }
}

/// Sign a new access token for the given user.
pub fn issue_token(
    user_id: i64,
    email: &str,
    username: &str,
    secret: &str,
    expiry_secs: u64,
) -> AuthResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::seconds(expiry_secs as i64);
    let claims = Claims {
        user_id,
        email: email.to_string(),
        username: username.to_string(),
        sub: user_id.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        iat: now.timestamp(),
        nbf: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::crypto(e.to_string()))
}

/// Validate a token and return its claims.
///
/// `leeway_secs` tolerates clock skew on the time-based claims. Required
/// claims (sub, exp, iat) are enforced by deserialization; a non-numeric
/// subject is rejected.
pub fn validate_token(token: &str, secret: &str, leeway_secs: u64) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = leeway_secs;
    validation.validate_nbf = true;
    validation.set_issuer(&[TOKEN_ISSUER]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::token_invalid(e.to_string()),
    })?;

    // Fail early if the subject cannot name a user.
    data.claims.subject_id()?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip() {
        let token = issue_token(42, "ada@example.com", "ada", SECRET, 3600).unwrap();
        let claims = validate_token(&token, SECRET, 0).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.subject_id().unwrap(), 42);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(1, "a@b.com", "a", SECRET, 3600).unwrap();
        let err = validate_token(&token, "other-secret", 0).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    fn token_expired_ago(secs: i64) -> String {
        let now = Utc::now();
        let claims = Claims {
            user_id: 1,
            email: "a@b.com".to_string(),
            username: "a".to_string(),
            sub: "1".to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: (now - Duration::seconds(secs + 3600)).timestamp(),
            nbf: (now - Duration::seconds(secs + 3600)).timestamp(),
            exp: (now - Duration::seconds(secs)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn expired_token_is_rejected() {
        let err = validate_token(&token_expired_ago(120), SECRET, 0).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn leeway_tolerates_a_just_expired_token() {
        assert!(validate_token(&token_expired_ago(30), SECRET, 60).is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        let err = validate_token("not.a.token", SECRET, 0).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }
}
