//! Handler error type.
//!
//! Every handler returns [`ApiResult<T>`]. Module errors convert into
//! [`ApiError`] through `From`, so handlers can use `?` directly.
//! Server-side failures are logged here and replaced with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::response::{ApiResponse, error_codes};

/// Result type for all API handlers
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 OK with data
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 200 OK with data and a user-facing message
pub fn ok_with_msg<T>(data: T, msg: impl Into<String>) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success_with_msg(data, msg))))
}

/// 201 Created with data and a user-facing message
pub fn created<T>(data: T, msg: impl Into<String>) -> ApiResult<T> {
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_msg(data, msg)),
    ))
}

/// Error rendered as the standard response envelope
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    /// Build from a module error's suggested HTTP status.
    pub fn from_parts(http_status: u16, code: i32, msg: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            let msg = msg.into();
            tracing::error!(code, "request failed: {}", msg);
            return Self::internal("Internal server error");
        }
        Self::new(status, code, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error_codes::FORBIDDEN, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    /// Log the database failure, return a generic message
    pub fn db_error(err: impl std::fmt::Display) -> Self {
        tracing::error!("database error: {}", err);
        Self::internal("Internal server error")
    }

    pub fn into_err<T>(self) -> Result<T, Self> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::db_error(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("internal error: {:?}", err);
        Self::internal("Internal server error")
    }
}

/// Numeric envelope code for a module error's string code
pub fn numeric_code(code: &str, http_status: u16) -> i32 {
    match code {
        "INSUFFICIENT_BALANCE" => error_codes::INSUFFICIENT_BALANCE,
        "INVALID_AMOUNT" | "MISSING_AMOUNT" | "NON_POSITIVE_AMOUNT" | "INVALID_QUANTITY" => {
            error_codes::INVALID_AMOUNT
        }
        "PASSWORD_MISMATCH" => error_codes::PASSWORD_MISMATCH,
        "WEAK_PASSWORD" => error_codes::WEAK_PASSWORD,
        "SAME_ACCOUNT" => error_codes::SAME_ACCOUNT,
        "INVALID_STATUS" => error_codes::INVALID_STATUS,
        "AUTH_FAILED" => error_codes::AUTH_FAILED,
        "TOKEN_REVOKED" => error_codes::TOKEN_REVOKED,
        "ACCOUNT_SUSPENDED" | "SENDER_INACTIVE" => error_codes::ACCOUNT_SUSPENDED,
        "RESET_TOKEN_INVALID" => error_codes::RESET_TOKEN_INVALID,
        "USERNAME_TAKEN" => error_codes::USERNAME_TAKEN,
        "EMAIL_TAKEN" => error_codes::EMAIL_TAKEN,
        "PHONE_TAKEN" => error_codes::PHONE_TAKEN,
        "RECIPIENT_NOT_FOUND" | "RECIPIENT_INACTIVE" => error_codes::RECIPIENT_NOT_FOUND,
        "TRANSFER_NOT_FOUND" => error_codes::TRANSFER_NOT_FOUND,
        "FORBIDDEN" => error_codes::FORBIDDEN,
        _ => match http_status {
            401 => error_codes::AUTH_FAILED,
            403 => error_codes::FORBIDDEN,
            404 => error_codes::NOT_FOUND,
            s if s >= 500 => error_codes::INTERNAL_ERROR,
            _ => error_codes::INVALID_PARAMETER,
        },
    }
}

/// Module errors expose `code()` and `http_status()`; route them all the same way.
macro_rules! impl_from_module_error {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    let status = err.http_status();
                    ApiError::from_parts(status, numeric_code(err.code(), status), err.to_string())
                }
            }
        )+
    };
}

impl_from_module_error!(
    crate::transfer::TransferError,
    crate::user_auth::AuthError,
    crate::account::AccountError,
    crate::ledger::LedgerError,
    crate::goals::GoalError,
    crate::budget::BudgetError,
    crate::donation::DonationError,
    crate::promotion::PromotionError,
    crate::learning::LearningError,
    crate::notification::NotificationError,
    crate::admin::AdminError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_hide_detail() {
        let err = ApiError::from_parts(500, 5000, "relation users_tb does not exist");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.msg, "Internal server error");
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = ApiError::from_parts(404, error_codes::RECIPIENT_NOT_FOUND, "gone");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, error_codes::RECIPIENT_NOT_FOUND);
        assert_eq!(err.msg, "gone");
    }

    #[test]
    fn test_transfer_errors_map_to_codes() {
        use crate::transfer::TransferError;

        let err = ApiError::from(TransferError::RecipientNotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, error_codes::RECIPIENT_NOT_FOUND);
        assert_eq!(err.msg, "Recipient not found with that phone number.");

        let err = ApiError::from(TransferError::MissingAmount);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, error_codes::INVALID_AMOUNT);

        let err = ApiError::from(TransferError::SenderNotFound);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, error_codes::AUTH_FAILED);

        let err = ApiError::from(TransferError::DatabaseError("deadlock".into()));
        assert_eq!(err.code, error_codes::INTERNAL_ERROR);
        assert_eq!(err.msg, "Internal server error");
    }

    #[test]
    fn test_auth_errors_map_to_codes() {
        use crate::user_auth::AuthError;

        let err = ApiError::from(AuthError::UsernameTaken);
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, error_codes::USERNAME_TAKEN);

        let err = ApiError::from(AuthError::AccountSuspended);
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, error_codes::ACCOUNT_SUSPENDED);
    }

    #[test]
    fn test_unknown_code_falls_back_on_status() {
        assert_eq!(numeric_code("NO_RECIPIENTS", 400), error_codes::INVALID_PARAMETER);
        assert_eq!(numeric_code("USER_NOT_FOUND", 404), error_codes::NOT_FOUND);
        assert_eq!(numeric_code("DATABASE_ERROR", 500), error_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let resp = ApiError::forbidden("no").into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
