//! Dashboard, users overview and notifications

use std::sync::Arc;

use axum::{Extension, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, ok};
use super::helpers::load_user;
use crate::dashboard::{self, Dashboard, UsersOverview};
use crate::notification::{self, Notification};
use crate::user_auth::AuthUser;

/// Dashboard summary for the caller
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Recent activity, goals and totals", body = ApiResponse<Dashboard>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Dashboard> {
    let pool = state.db.pool();
    let user = load_user(pool, user.user_id).await?;
    ok(dashboard::load(pool, &user).await?)
}

/// User count and membership breakdown
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users overview", body = ApiResponse<UsersOverview>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn get_users_overview(State(state): State<Arc<AppState>>) -> ApiResult<UsersOverview> {
    ok(dashboard::users_overview(state.db.pool()).await?)
}

/// Active notifications addressed to the caller
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notifications, newest first", body = ApiResponse<Vec<Notification>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Notification>> {
    ok(notification::list_for_user(state.db.pool(), user.user_id).await?)
}
