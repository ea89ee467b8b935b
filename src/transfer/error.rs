//! Transfer Error Types

use thiserror::Error;

/// Transfer error types
///
/// User-facing messages are the display strings; `code()` gives a stable
/// machine-readable name.
#[derive(Error, Debug, Clone)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Please enter an amount to transfer.")]
    MissingAmount,

    #[error("Please enter a valid amount.")]
    InvalidAmount,

    #[error("Amount must be greater than 0.")]
    NonPositiveAmount,

    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    #[error("Invalid idempotency key")]
    InvalidIdempotencyKey,

    // === Account Errors ===
    #[error("Recipient not found with that phone number.")]
    RecipientNotFound,

    #[error("Recipient account is not active.")]
    RecipientInactive,

    #[error("You cannot send money to yourself.")]
    SameAccount,

    #[error("Your account is suspended. Transfers are disabled.")]
    SenderInactive,

    /// Token is valid but its user row is gone
    #[error("Your session is no longer valid. Please sign in again.")]
    SenderNotFound,

    #[error("Insufficient balance: available {available} {currency}, required {required} {currency}")]
    InsufficientBalance {
        available: String,
        required: String,
        currency: String,
    },

    // === Lookup Errors ===
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    #[error("You do not have access to this transfer.")]
    Forbidden,

    #[error("Invalid transfer status: {0}")]
    InvalidStatus(String),

    // === System Errors ===
    #[error("Could not allocate a unique reference number")]
    ReferenceExhausted,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::MissingAmount => "MISSING_AMOUNT",
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            TransferError::InvalidCurrency(_) => "INVALID_CURRENCY",
            TransferError::InvalidIdempotencyKey => "INVALID_IDEMPOTENCY_KEY",
            TransferError::RecipientNotFound => "RECIPIENT_NOT_FOUND",
            TransferError::RecipientInactive => "RECIPIENT_INACTIVE",
            TransferError::SameAccount => "SAME_ACCOUNT",
            TransferError::SenderInactive => "SENDER_INACTIVE",
            TransferError::SenderNotFound => "AUTH_FAILED",
            TransferError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            TransferError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::Forbidden => "FORBIDDEN",
            TransferError::InvalidStatus(_) => "INVALID_STATUS",
            TransferError::ReferenceExhausted => "REFERENCE_EXHAUSTED",
            TransferError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::MissingAmount
            | TransferError::InvalidAmount
            | TransferError::NonPositiveAmount
            | TransferError::InvalidCurrency(_)
            | TransferError::InvalidIdempotencyKey
            | TransferError::SameAccount
            | TransferError::InvalidStatus(_) => 400,
            TransferError::SenderNotFound => 401,
            TransferError::SenderInactive | TransferError::Forbidden => 403,
            TransferError::RecipientNotFound | TransferError::TransferNotFound(_) => 404,
            TransferError::RecipientInactive | TransferError::InsufficientBalance { .. } => 422,
            TransferError::ReferenceExhausted | TransferError::DatabaseError(_) => 500,
        }
    }
}

impl From<sqlx::Error> for TransferError {
    fn from(err: sqlx::Error) -> Self {
        TransferError::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            TransferError::MissingAmount.to_string(),
            "Please enter an amount to transfer."
        );
        assert_eq!(
            TransferError::InvalidAmount.to_string(),
            "Please enter a valid amount."
        );
        assert_eq!(
            TransferError::NonPositiveAmount.to_string(),
            "Amount must be greater than 0."
        );
        assert_eq!(
            TransferError::RecipientNotFound.to_string(),
            "Recipient not found with that phone number."
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(TransferError::MissingAmount.http_status(), 400);
        assert_eq!(TransferError::RecipientNotFound.http_status(), 404);
        assert_eq!(TransferError::Forbidden.http_status(), 403);
        assert_eq!(
            TransferError::InsufficientBalance {
                available: "0.00".into(),
                required: "102.00".into(),
                currency: "USD".into(),
            }
            .http_status(),
            422
        );
        assert_eq!(TransferError::DatabaseError("x".into()).http_status(), 500);
    }

    #[test]
    fn test_missing_sender_is_an_auth_failure() {
        let err = TransferError::SenderNotFound;
        assert_eq!(err.http_status(), 401);
        assert_eq!(err.code(), "AUTH_FAILED");
        assert!(!err.to_string().contains("access to this transfer"));
    }

    #[test]
    fn test_codes_unique() {
        let errors = [
            TransferError::MissingAmount,
            TransferError::InvalidAmount,
            TransferError::NonPositiveAmount,
            TransferError::RecipientNotFound,
            TransferError::SameAccount,
            TransferError::Forbidden,
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
