//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Standard error code constants
//! - `MessageData`: Payload for endpoints that only report an outcome

use serde::Serialize;
use utoipa::ToSchema;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Success response carrying a user-facing message instead of "ok"
    pub fn success_with_msg(data: T, msg: impl Into<String>) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: msg.into(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Outcome-only payload
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageData {
    #[schema(example = "Budget entry saved.")]
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const INVALID_AMOUNT: i32 = 1003;
    pub const PASSWORD_MISMATCH: i32 = 1004;
    pub const WEAK_PASSWORD: i32 = 1005;
    pub const SAME_ACCOUNT: i32 = 1006;
    pub const INVALID_STATUS: i32 = 1007;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const TOKEN_REVOKED: i32 = 2003;
    pub const ACCOUNT_SUSPENDED: i32 = 2004;
    pub const RESET_TOKEN_INVALID: i32 = 2005;

    // Conflict errors (3xxx)
    pub const USERNAME_TAKEN: i32 = 3001;
    pub const EMAIL_TAKEN: i32 = 3002;
    pub const PHONE_TAKEN: i32 = 3003;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4001;
    pub const RECIPIENT_NOT_FOUND: i32 = 4002;
    pub const TRANSFER_NOT_FOUND: i32 = 4003;
    pub const FORBIDDEN: i32 = 4030;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serializes_data() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["msg"], "ok");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn test_error_omits_data() {
        let json =
            serde_json::to_value(ApiResponse::<()>::error(error_codes::NOT_FOUND, "missing"))
                .unwrap();
        assert_eq!(json["code"], 4001);
        assert!(json.get("data").is_none());
    }
}
