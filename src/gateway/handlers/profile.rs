use std::sync::Arc;

use axum::{Extension, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, ValidatedBody, ok, ok_with_msg};
use crate::account::profile::{get_profile as load_profile, update_profile as save_profile};
use crate::account::{ProfileUpdateRequest, ProfileView};
use crate::user_auth::AuthUser;

/// The caller's profile, created with defaults on first access
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ApiResponse<ProfileView>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<ProfileView> {
    ok(load_profile(state.db.pool(), user.user_id).await?)
}

/// Update editable profile fields
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<ProfileView>),
        (status = 400, description = "Invalid phone number or currency"),
        (status = 409, description = "Phone number already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedBody(req): ValidatedBody<ProfileUpdateRequest>,
) -> ApiResult<ProfileView> {
    let view = save_profile(state.db.pool(), user.user_id, req).await?;
    ok_with_msg(view, "Profile updated.")
}
