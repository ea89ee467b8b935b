//! Gateway types module
//!
//! ## Submodules
//! - [`response`]: `ApiResponse<T>` envelope and error codes
//! - [`error`]: `ApiError` and the `ApiResult` handler return type
//! - [`extract`]: `ValidatedBody<T>` (JSON or form, validated)

pub mod error;
pub mod extract;
pub mod response;

// Re-export commonly used types at module root
pub use error::{ApiError, ApiResult, created, ok, ok_with_msg};
pub use extract::{ValidatedBody, validation_message};
pub use response::{ApiResponse, MessageData, error_codes};
