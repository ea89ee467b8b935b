use axum::{
    Extension,
    extract::{Path, State},
};
use std::sync::Arc;

use super::middleware::AuthUser;
use super::password_reset::{
    PasswordResetConfirm, PasswordResetIssued, PasswordResetRequest, RESET_CONFIRMED_MSG,
    ResetTokenStatus,
};
use super::service::{AuthResponse, LoginRequest, RegisterOptions, RegisterRequest, register_options};
use crate::account::validation::non_blank;
use crate::gateway::state::AppState;
use crate::gateway::types::{
    ApiResponse, ApiResult, MessageData, ValidatedBody, created, ok, ok_with_msg,
};

/// Register a new user
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered and logged in", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing fields or password rules not met"),
        (status = 409, description = "Username, email or phone already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedBody(req): ValidatedBody<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let greeting_name = non_blank(req.first_name.as_deref()).map(str::to_string);
    let resp = state.user_auth.register(req).await?;
    let name = greeting_name.unwrap_or_else(|| resp.username.clone());
    created(resp, format!("Welcome to Remittence, {}!", name))
}

/// Login user
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account suspended")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedBody(req): ValidatedBody<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let resp = state.user_auth.login(req).await?;
    ok_with_msg(resp, "Welcome back!")
}

/// Revoke the current token
///
/// POST /api/v1/auth/logout
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = ApiResponse<MessageData>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<MessageData> {
    state.user_auth.logout(&user.claims);
    let msg = "You have been signed out.";
    ok_with_msg(MessageData::new(msg), msg)
}

/// Countries and currencies for the registration form
#[utoipa::path(
    get,
    path = "/api/v1/auth/register/options",
    responses(
        (status = 200, description = "Registration choices", body = ApiResponse<RegisterOptions>)
    ),
    tag = "Auth"
)]
pub async fn get_register_options() -> ApiResult<RegisterOptions> {
    ok(register_options())
}

/// Request a password reset link
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Generic acknowledgement", body = ApiResponse<PasswordResetIssued>),
        (status = 400, description = "Email missing")
    ),
    tag = "Auth"
)]
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    ValidatedBody(req): ValidatedBody<PasswordResetRequest>,
) -> ApiResult<PasswordResetIssued> {
    let issued = state.password_reset.request(req.email.as_deref()).await?;
    let msg = issued.message.clone();
    ok_with_msg(issued, msg)
}

/// Check a reset token before showing the new-password form
#[utoipa::path(
    get,
    path = "/api/v1/auth/password-reset/{token}",
    params(("token" = String, Path, description = "Reset token")),
    responses(
        (status = 200, description = "Token usable", body = ApiResponse<ResetTokenStatus>),
        (status = 400, description = "Invalid or expired reset link")
    ),
    tag = "Auth"
)]
pub async fn check_password_reset(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> ApiResult<ResetTokenStatus> {
    ok(state.password_reset.check(&token).await?)
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/{token}",
    params(("token" = String, Path, description = "Reset token")),
    request_body = PasswordResetConfirm,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<MessageData>),
        (status = 400, description = "Invalid token or password rules not met")
    ),
    tag = "Auth"
)]
pub async fn confirm_password_reset(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    ValidatedBody(req): ValidatedBody<PasswordResetConfirm>,
) -> ApiResult<MessageData> {
    state.password_reset.confirm(&token, &req).await?;
    ok_with_msg(MessageData::new(RESET_CONFIRMED_MSG), RESET_CONFIRMED_MSG)
}
