//! Ledger, saving-goal and budget handlers

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query, State},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, MessageData, ValidatedBody, created, ok, ok_with_msg};
use super::helpers::LimitQuery;
use crate::budget::{self, BUDGET_SAVED_MSG, BudgetEntryView, BudgetQuery, BudgetSummary, UpsertBudgetRequest};
use crate::goals::{self, CreateGoalRequest, GoalView};
use crate::ledger::{CreateTransactionRequest, LedgerRepository, TransactionView, record_transaction};
use crate::user_auth::AuthUser;

/// Recent transactions, newest first
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(LimitQuery),
    responses(
        (status = 200, description = "Transactions", body = ApiResponse<Vec<TransactionView>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Ledger"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<TransactionView>> {
    let rows = LedgerRepository::recent(state.db.pool(), user.user_id, query.limit()).await?;
    ok(rows.into_iter().map(TransactionView::from).collect())
}

/// Record a transaction
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction added", body = ApiResponse<TransactionView>),
        (status = 400, description = "Invalid amount, kind or date")
    ),
    security(("bearer_auth" = [])),
    tag = "Ledger"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedBody(req): ValidatedBody<CreateTransactionRequest>,
) -> ApiResult<TransactionView> {
    let view = record_transaction(state.db.pool(), user.user_id, req).await?;
    created(view, "Transaction added successfully!")
}

/// Saving goals with progress
#[utoipa::path(
    get,
    path = "/api/v1/goals",
    responses(
        (status = 200, description = "Goals ordered by due date", body = ApiResponse<Vec<GoalView>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<GoalView>> {
    ok(goals::list_goals(state.db.pool(), user.user_id, None).await?)
}

/// Create a saving goal
#[utoipa::path(
    post,
    path = "/api/v1/goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal saved", body = ApiResponse<GoalView>),
        (status = 400, description = "Invalid amount, date or status")
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedBody(req): ValidatedBody<CreateGoalRequest>,
) -> ApiResult<GoalView> {
    let goal = goals::create_goal(state.db.pool(), user.user_id, &req).await?;
    created(goal, "Goal saved successfully!")
}

/// Budget for one month
#[utoipa::path(
    get,
    path = "/api/v1/budget",
    params(BudgetQuery),
    responses(
        (status = 200, description = "Entries and totals", body = ApiResponse<BudgetSummary>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Budget"
)]
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BudgetQuery>,
) -> ApiResult<BudgetSummary> {
    ok(budget::summary(state.db.pool(), user.user_id, query.month.as_deref()).await?)
}

/// Create or replace the entry for a category and month
#[utoipa::path(
    post,
    path = "/api/v1/budget",
    request_body = UpsertBudgetRequest,
    responses(
        (status = 200, description = "Entry saved", body = ApiResponse<BudgetEntryView>),
        (status = 400, description = "Invalid amount or month")
    ),
    security(("bearer_auth" = [])),
    tag = "Budget"
)]
pub async fn upsert_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedBody(req): ValidatedBody<UpsertBudgetRequest>,
) -> ApiResult<BudgetEntryView> {
    let entry = budget::save_entry(state.db.pool(), user.user_id, &req).await?;
    ok_with_msg(entry, BUDGET_SAVED_MSG)
}

/// Delete one of the caller's budget entries
#[utoipa::path(
    delete,
    path = "/api/v1/budget/{entry_id}",
    params(("entry_id" = i64, Path, description = "Budget entry id")),
    responses(
        (status = 200, description = "Entry deleted", body = ApiResponse<MessageData>),
        (status = 404, description = "No such entry for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Budget"
)]
pub async fn delete_budget_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(entry_id): Path<i64>,
) -> ApiResult<MessageData> {
    budget::delete_entry(state.db.pool(), user.user_id, entry_id).await?;
    let msg = "Budget entry deleted.";
    ok_with_msg(MessageData::new(msg), msg)
}
