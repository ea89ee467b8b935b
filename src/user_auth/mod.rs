//! User authentication
//!
//! - [`service`]: registration, login, JWT issue/verify, logout deny-list
//! - [`password_reset`]: single-use reset tokens
//! - [`middleware`]: bearer-token, optional-auth and admin guards
//! - [`handlers`]: `/api/v1/auth/*` endpoints

pub mod handlers;
pub mod middleware;
pub mod password_reset;
pub mod service;

pub use middleware::{AuthUser, MaybeUser, jwt_auth_middleware, optional_auth_middleware, require_admin};
pub use password_reset::{LogResetLinkSender, PasswordResetService, ResetLinkSender};
pub use service::{AuthError, Claims, UserAuthService};
