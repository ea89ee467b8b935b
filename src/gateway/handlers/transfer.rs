//! Peer-to-peer transfer handlers

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query, State},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, ValidatedBody, created, ok, ok_with_msg};
use super::helpers::{LimitQuery, is_admin};
use crate::transfer::{TransferReceipt, TransferRequest, TransferView};
use crate::user_auth::AuthUser;

/// Send money to another user by phone number
///
/// A 2% service fee is added to the amount. Resubmitting with the same
/// `idempotency_key` returns the first receipt without moving money again.
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = TransferRequest,
    responses(
        (status = 201, description = "Transfer completed", body = ApiResponse<TransferReceipt>),
        (status = 200, description = "Earlier transfer with the same idempotency key", body = ApiResponse<TransferReceipt>),
        (status = 400, description = "Invalid amount, currency or recipient"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipient not found"),
        (status = 422, description = "Insufficient balance or inactive recipient")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedBody(req): ValidatedBody<TransferRequest>,
) -> ApiResult<TransferReceipt> {
    let receipt = state.transfers.submit(user.user_id, &req).await?;
    let msg = receipt.message();
    if receipt.replayed {
        ok_with_msg(receipt, msg)
    } else {
        created(receipt, msg)
    }
}

/// Transfers sent or received by the caller, newest first
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    params(LimitQuery),
    responses(
        (status = 200, description = "Transfer history", body = ApiResponse<Vec<TransferView>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<TransferView>> {
    ok(state.transfers.list_for_user(user.user_id, query.limit()).await?)
}

/// One transfer by reference number
///
/// Visible to its sender, its recipient and admins.
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{reference}",
    params(("reference" = String, Path, description = "8-character reference number")),
    responses(
        (status = 200, description = "Transfer", body = ApiResponse<TransferView>),
        (status = 403, description = "Not a party to this transfer"),
        (status = 404, description = "Transfer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(reference): Path<String>,
) -> ApiResult<TransferView> {
    let admin = is_admin(state.db.pool(), user.user_id).await?;
    ok(state
        .transfers
        .get_for_user(user.user_id, admin, &reference)
        .await?)
}
