//! Admin console operations

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::account::repository::ProfileSummary;
use crate::account::{ProfileRepository, UserRepository};
use crate::money::format_money;
use crate::transfer::{TransferDb, TransferError, TransferView};

const RECENT_TRANSFERS: i64 = 10;
const RECENT_PROFILES: i64 = 15;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AdminError {
    pub fn code(&self) -> &'static str {
        match self {
            AdminError::UserNotFound => "USER_NOT_FOUND",
            AdminError::Transfer(e) => e.code(),
            AdminError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            AdminError::UserNotFound => 404,
            AdminError::Transfer(e) => e.http_status(),
            AdminError::Database(_) => 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminMetrics {
    pub total_users: i64,
    pub total_transfers: i64,
    pub pending_transfers: i64,
    /// Sum of service fees on completed transfers
    #[schema(example = "124.50")]
    pub total_earnings: String,
    /// Completed share of all transfers, 0-100
    #[schema(example = 87.5)]
    pub success_rate: f64,
    pub recent_transfers: Vec<TransferView>,
    pub recent_profiles: Vec<ProfileSummary>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateTransferStatusRequest {
    /// pending | completed | failed | cancelled
    #[validate(length(min = 1, message = "This field is required."))]
    #[schema(example = "failed")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggledUser {
    pub user_id: i64,
    pub username: String,
    pub is_active: bool,
}

impl ToggledUser {
    pub fn message(&self) -> String {
        format!(
            "User {} has been {}.",
            self.username,
            if self.is_active { "activated" } else { "suspended" }
        )
    }
}

/// Completed transfers as a percentage of all transfers, rounded to 2dp
pub fn success_rate(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = completed as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

pub async fn metrics(pool: &PgPool, transfers: &TransferDb) -> Result<AdminMetrics, AdminError> {
    let total_users = UserRepository::count(pool).await?;
    let (total, completed, pending) = transfers.status_counts().await?;
    let earnings = transfers.completed_fee_total().await?;
    let recent_transfers = transfers
        .recent(RECENT_TRANSFERS)
        .await?
        .into_iter()
        .map(TransferView::from)
        .collect();
    let recent_profiles = ProfileRepository::recent(pool, RECENT_PROFILES).await?;

    Ok(AdminMetrics {
        total_users,
        total_transfers: total,
        pending_transfers: pending,
        total_earnings: format_money(earnings),
        success_rate: success_rate(completed, total),
        recent_transfers,
        recent_profiles,
    })
}

/// Flip the user's active flag, creating the profile first if missing
pub async fn toggle_user(pool: &PgPool, admin_id: i64, user_id: i64) -> Result<ToggledUser, AdminError> {
    let user = UserRepository::get_by_id(pool, user_id)
        .await?
        .ok_or(AdminError::UserNotFound)?;
    let profile = ProfileRepository::ensure_profile(pool, &user).await?;
    let updated = ProfileRepository::set_active(pool, user_id, !profile.is_active).await?;

    tracing::info!(admin_id, user_id, is_active = updated.is_active, "user active flag toggled");

    Ok(ToggledUser {
        user_id,
        username: user.username,
        is_active: updated.is_active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(3, 4), 75.0);
        assert_eq!(success_rate(5, 5), 100.0);
        assert!((success_rate(1, 3) - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_toggle_message() {
        let mut toggled = ToggledUser {
            user_id: 1,
            username: "amina".to_string(),
            is_active: false,
        };
        assert_eq!(toggled.message(), "User amina has been suspended.");
        toggled.is_active = true;
        assert_eq!(toggled.message(), "User amina has been activated.");
    }
}
