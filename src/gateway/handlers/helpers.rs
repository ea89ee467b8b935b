//! Shared handler utilities

use serde::Deserialize;
use utoipa::IntoParams;

use crate::account::{ProfileRepository, User, UserRepository};
use crate::gateway::types::ApiError;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// `?limit=` for list endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// 1-100, default 10
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// The authenticated user's row. A valid token for a deleted user is a 401.
pub async fn load_user(pool: &sqlx::PgPool, user_id: i64) -> Result<User, ApiError> {
    UserRepository::get_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))
}

pub async fn is_admin(pool: &sqlx::PgPool, user_id: i64) -> Result<bool, ApiError> {
    Ok(ProfileRepository::get_by_user(pool, user_id)
        .await?
        .is_some_and(|p| p.is_admin()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_clamped() {
        assert_eq!(LimitQuery { limit: None }.limit(), 10);
        assert_eq!(LimitQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(LimitQuery { limit: Some(25) }.limit(), 25);
        assert_eq!(LimitQuery { limit: Some(5000) }.limit(), 100);
    }
}
