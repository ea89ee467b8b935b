//! Donations, promotions, learning resources and the chatbot

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, ValidatedBody, created, ok};
use super::helpers::load_user;
use crate::chatbot::{self, ChatReply, ChatRequest};
use crate::donation::{self, CreateDonationRequest, DONATION_THANKS_MSG, Donation, DonationStats};
use crate::learning::{self, LearningCatalog, LearningQuery};
use crate::promotion::{self, PromotionList};
use crate::user_auth::MaybeUser;

/// Pledge sanitary-pad packs
///
/// Anonymous donors must give a name and e-mail; signed-in donors default
/// to their own.
#[utoipa::path(
    post,
    path = "/api/v1/donations",
    request_body = CreateDonationRequest,
    responses(
        (status = 201, description = "Donation recorded", body = ApiResponse<Donation>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Bearer token present but invalid")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Community"
)]
pub async fn create_donation(
    State(state): State<Arc<AppState>>,
    Extension(MaybeUser(caller)): Extension<MaybeUser>,
    ValidatedBody(req): ValidatedBody<CreateDonationRequest>,
) -> ApiResult<Donation> {
    let pool = state.db.pool();
    let donor = match caller {
        Some(auth) => Some(load_user(pool, auth.user_id).await?),
        None => None,
    };
    let row = donation::create_donation(pool, donor.as_ref(), &req).await?;
    created(row, DONATION_THANKS_MSG)
}

/// Campaign totals and the latest pledges
#[utoipa::path(
    get,
    path = "/api/v1/donations/stats",
    responses(
        (status = 200, description = "Donation statistics", body = ApiResponse<DonationStats>)
    ),
    tag = "Community"
)]
pub async fn donation_stats(State(state): State<Arc<AppState>>) -> ApiResult<DonationStats> {
    ok(donation::stats(state.db.pool()).await?)
}

/// Promotions live today, highest priority first
#[utoipa::path(
    get,
    path = "/api/v1/promotions",
    responses(
        (status = 200, description = "Live promotions", body = ApiResponse<PromotionList>)
    ),
    tag = "Community"
)]
pub async fn list_promotions(State(state): State<Arc<AppState>>) -> ApiResult<PromotionList> {
    ok(promotion::list_live(state.db.pool()).await?)
}

/// Learning resources with per-category counts
#[utoipa::path(
    get,
    path = "/api/v1/learning",
    params(LearningQuery),
    responses(
        (status = 200, description = "Learning catalog", body = ApiResponse<LearningCatalog>),
        (status = 400, description = "Unknown category")
    ),
    tag = "Community"
)]
pub async fn list_learning(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LearningQuery>,
) -> ApiResult<LearningCatalog> {
    ok(learning::catalog(state.db.pool(), query.category.as_deref()).await?)
}

/// Ask the assistant
#[utoipa::path(
    post,
    path = "/api/v1/chatbot",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatReply)
    ),
    tag = "Community"
)]
pub async fn chatbot(ValidatedBody(req): ValidatedBody<ChatRequest>) -> Json<ChatReply> {
    Json(ChatReply {
        reply: chatbot::reply(&req.user_input),
    })
}
