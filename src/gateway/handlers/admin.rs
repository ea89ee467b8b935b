//! Admin console handlers. Routed behind `require_admin`.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, ValidatedBody, created, ok, ok_with_msg};
use crate::admin::{self, AdminMetrics, ToggledUser, UpdateTransferStatusRequest};
use crate::learning::{self, CreateLearningResourceRequest, LearningResource};
use crate::notification::{self, SendNotificationRequest, SentNotification};
use crate::promotion::{self, CreatePromotionRequest, Promotion};
use crate::transfer::TransferView;
use crate::user_auth::AuthUser;

/// Platform metrics
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    responses(
        (status = 200, description = "Metrics, recent transfers and profiles", body = ApiResponse<AdminMetrics>),
        (status = 403, description = "Administrator privileges required")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_dashboard(State(state): State<Arc<AppState>>) -> ApiResult<AdminMetrics> {
    ok(admin::metrics(state.db.pool(), state.transfers.db()).await?)
}

/// Set a transfer's status
#[utoipa::path(
    post,
    path = "/api/v1/admin/transfers/{transfer_id}/status",
    params(("transfer_id" = i64, Path, description = "Transfer id")),
    request_body = UpdateTransferStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<TransferView>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Transfer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_transfer_status(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<i64>,
    ValidatedBody(req): ValidatedBody<UpdateTransferStatusRequest>,
) -> ApiResult<TransferView> {
    let record = state.transfers.update_status(transfer_id, &req.status).await?;
    let view = state
        .transfers
        .get_for_user(record.sender_id, true, &record.reference_number)
        .await?;
    let msg = format!(
        "Transfer {} marked as {}.",
        view.reference_number,
        view.status.as_str()
    );
    ok_with_msg(view, msg)
}

/// Activate or suspend a user
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{user_id}/toggle",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Active flag flipped", body = ApiResponse<ToggledUser>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn toggle_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> ApiResult<ToggledUser> {
    let toggled = admin::toggle_user(state.db.pool(), caller.user_id, user_id).await?;
    let msg = toggled.message();
    ok_with_msg(toggled, msg)
}

/// Send a notification to everyone or to listed users
#[utoipa::path(
    post,
    path = "/api/v1/admin/notifications",
    request_body = SendNotificationRequest,
    responses(
        (status = 201, description = "Notification sent", body = ApiResponse<SentNotification>),
        (status = 400, description = "No recipients or invalid type")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedBody(req): ValidatedBody<SendNotificationRequest>,
) -> ApiResult<SentNotification> {
    let sent = notification::send(state.db.pool(), caller.user_id, &req).await?;
    let msg = notification::sent_message(&sent.notification.title);
    created(sent, msg)
}

/// Create a promotion
#[utoipa::path(
    post,
    path = "/api/v1/admin/promotions",
    request_body = CreatePromotionRequest,
    responses(
        (status = 201, description = "Promotion created", body = ApiResponse<Promotion>),
        (status = 400, description = "Invalid fields or validity window")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_promotion(
    State(state): State<Arc<AppState>>,
    ValidatedBody(req): ValidatedBody<CreatePromotionRequest>,
) -> ApiResult<Promotion> {
    let row = promotion::create_promotion(state.db.pool(), &req).await?;
    created(row, "Promotion created.")
}

/// Create a learning resource
#[utoipa::path(
    post,
    path = "/api/v1/admin/learning",
    request_body = CreateLearningResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = ApiResponse<LearningResource>),
        (status = 400, description = "Invalid category, level or type")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_learning_resource(
    State(state): State<Arc<AppState>>,
    ValidatedBody(req): ValidatedBody<CreateLearningResourceRequest>,
) -> ApiResult<LearningResource> {
    let row = learning::create_resource(state.db.pool(), &req).await?;
    created(row, "Learning resource created.")
}
