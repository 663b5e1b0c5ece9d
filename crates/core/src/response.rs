//! Shared API response types
//!
//! Every error the API returns uses the same `{ "code": ..., "message": ... }`
//! envelope so clients can branch on a stable machine-readable code.

use serde::{Deserialize, Serialize};

/// Machine-readable error codes used in the API envelope.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const AUTHENTICATION_ERROR: &str = "AUTHENTICATION_ERROR";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const NOT_IMPLEMENTED: &str = "NOT_IMPLEMENTED";
}

/// JSON error envelope returned by every failing API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_with_stable_keys() {
        let body = ErrorBody::new(codes::VALIDATION_ERROR, "name is required");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "name is required");
    }
}
