//! Saving goals
//!
//! Progress is derived, never stored: `current / target × 100`, capped at
//! 100, and 0 when the target is 0.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::account::validation::{ValidationError, non_blank, parse_optional_date};
use crate::money::{AmountInput, MoneyError, format_money, parse_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    OnTrack,
    Behind,
    Ahead,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::OnTrack => "on_track",
            GoalStatus::Behind => "behind",
            GoalStatus::Ahead => "ahead",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::OnTrack => "On Track",
            GoalStatus::Behind => "Behind",
            GoalStatus::Ahead => "Ahead",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "on_track" => Ok(GoalStatus::OnTrack),
            "behind" => Ok(GoalStatus::Behind),
            "ahead" => Ok(GoalStatus::Ahead),
            other => Err(ValidationError::InvalidChoice {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Percentage of `target` reached, in `[0, 100]`
pub fn progress_percent(current: Decimal, target: Decimal) -> f64 {
    if target <= Decimal::ZERO {
        return 0.0;
    }
    let pct = (current / target * Decimal::ONE_HUNDRED)
        .min(Decimal::ONE_HUNDRED)
        .max(Decimal::ZERO)
        .round_dp(2);
    pct.to_f64().unwrap_or(0.0)
}

/// `saving_goals_tb` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SavingGoal {
    pub goal_id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl SavingGoal {
    pub fn status(&self) -> GoalStatus {
        self.status.parse().unwrap_or_default()
    }

    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.current_amount, self.target_amount)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GoalView {
    pub goal_id: i64,
    pub name: String,
    #[schema(example = "1000.00")]
    pub target_amount: String,
    #[schema(example = "250.00")]
    pub current_amount: String,
    #[schema(example = 25.0)]
    pub progress_percent: f64,
    pub status: GoalStatus,
    #[schema(example = "On Track")]
    pub status_label: &'static str,
    pub due_date: Option<NaiveDate>,
}

impl From<SavingGoal> for GoalView {
    fn from(goal: SavingGoal) -> Self {
        let status = goal.status();
        Self {
            goal_id: goal.goal_id,
            progress_percent: goal.progress_percent(),
            target_amount: format_money(goal.target_amount),
            current_amount: format_money(goal.current_amount),
            name: goal.name,
            status,
            status_label: status.label(),
            due_date: goal.due_date,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 120, message = "This field is required (max 120 characters)."))]
    #[schema(example = "School fees")]
    pub name: String,
    #[schema(value_type = String, example = "1000.00")]
    pub target_amount: AmountInput,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "250.00")]
    pub current_amount: Option<AmountInput>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    #[schema(example = "2025-12-31")]
    pub due_date: Option<String>,
    /// on_track | behind | ahead (default on_track)
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Error, Debug)]
pub enum GoalError {
    #[error("{field}: {source}")]
    InvalidAmount {
        field: &'static str,
        source: MoneyError,
    },

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl GoalError {
    pub fn code(&self) -> &'static str {
        match self {
            GoalError::InvalidAmount { .. } => "INVALID_AMOUNT",
            GoalError::Invalid(_) => "INVALID_PARAMETER",
            GoalError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            GoalError::InvalidAmount { .. } | GoalError::Invalid(_) => 400,
            GoalError::Database(_) => 500,
        }
    }
}

/// Goal values after input checks
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub status: GoalStatus,
}

pub fn validate_goal(req: &CreateGoalRequest) -> Result<NewGoal, GoalError> {
    let name = non_blank(Some(req.name.as_str())).ok_or(ValidationError::Required { field: "name" })?;
    let target_amount = parse_amount(req.target_amount.as_str()).map_err(|source| {
        GoalError::InvalidAmount {
            field: "target_amount",
            source,
        }
    })?;
    let current_amount = match req.current_amount.as_ref().map(|a| a.as_str().trim()) {
        Some(raw) if !raw.is_empty() => {
            parse_amount(raw).map_err(|source| GoalError::InvalidAmount {
                field: "current_amount",
                source,
            })?
        }
        _ => Decimal::ZERO,
    };
    let status = match non_blank(req.status.as_deref()) {
        Some(s) => s.parse()?,
        None => GoalStatus::default(),
    };

    Ok(NewGoal {
        name: name.to_string(),
        target_amount,
        current_amount,
        due_date: parse_optional_date("due_date", req.due_date.as_deref())?,
        status,
    })
}

pub struct GoalRepository;

impl GoalRepository {
    pub async fn insert(pool: &PgPool, user_id: i64, goal: &NewGoal) -> Result<SavingGoal, sqlx::Error> {
        sqlx::query_as::<_, SavingGoal>(
            r#"INSERT INTO saving_goals_tb
                   (user_id, name, target_amount, current_amount, due_date, status)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING goal_id, user_id, name, target_amount, current_amount,
                         due_date, status, created_at"#,
        )
        .bind(user_id)
        .bind(&goal.name)
        .bind(goal.target_amount)
        .bind(goal.current_amount)
        .bind(goal.due_date)
        .bind(goal.status.as_str())
        .fetch_one(pool)
        .await
    }

    /// Ordered by due date (undated last), then name. `None` lists all.
    pub async fn list(
        pool: &PgPool,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<SavingGoal>, sqlx::Error> {
        sqlx::query_as::<_, SavingGoal>(
            r#"SELECT goal_id, user_id, name, target_amount, current_amount,
                      due_date, status, created_at
               FROM saving_goals_tb
               WHERE user_id = $1
               ORDER BY due_date ASC NULLS LAST, name ASC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

pub async fn create_goal(
    pool: &PgPool,
    user_id: i64,
    req: &CreateGoalRequest,
) -> Result<GoalView, GoalError> {
    let goal = validate_goal(req)?;
    let row = GoalRepository::insert(pool, user_id, &goal).await?;
    tracing::info!(user_id, goal_id = row.goal_id, "saving goal created");
    Ok(row.into())
}

pub async fn list_goals(
    pool: &PgPool,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<GoalView>, GoalError> {
    let rows = GoalRepository::list(pool, user_id, limit).await?;
    Ok(rows.into_iter().map(GoalView::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(target: &str) -> CreateGoalRequest {
        CreateGoalRequest {
            name: " Laptop ".to_string(),
            target_amount: AmountInput(target.to_string()),
            current_amount: Some(AmountInput("250".to_string())),
            due_date: Some("2025-12-31".to_string()),
            status: None,
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(Decimal::from(250), Decimal::from(1000)), 25.0);
        assert_eq!(progress_percent(Decimal::from(1500), Decimal::from(1000)), 100.0);
        assert_eq!(progress_percent(Decimal::from(10), Decimal::ZERO), 0.0);
        assert!((progress_percent(Decimal::ONE, Decimal::from(3)) - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(GoalStatus::OnTrack.label(), "On Track");
        assert_eq!("behind".parse::<GoalStatus>().unwrap(), GoalStatus::Behind);
        assert!("late".parse::<GoalStatus>().is_err());
    }

    #[test]
    fn test_validate_goal() {
        let goal = validate_goal(&request("1000")).unwrap();
        assert_eq!(goal.name, "Laptop");
        assert_eq!(goal.current_amount, Decimal::from(250));
        assert_eq!(goal.status, GoalStatus::OnTrack);
        assert_eq!(goal.due_date, NaiveDate::from_ymd_opt(2025, 12, 31));
    }

    #[test]
    fn test_validate_goal_rejects_bad_input() {
        assert!(matches!(
            validate_goal(&request("lots")),
            Err(GoalError::InvalidAmount { field: "target_amount", .. })
        ));

        let mut req = request("100");
        req.due_date = Some("31/12/2025".to_string());
        assert!(matches!(validate_goal(&req), Err(GoalError::Invalid(_))));

        let mut req = request("100");
        req.status = Some("late".to_string());
        assert!(matches!(validate_goal(&req), Err(GoalError::Invalid(_))));
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let mut req = request("100");
        req.name = "   ".to_string();
        assert!(req.validate().is_ok());
        assert!(matches!(
            validate_goal(&req),
            Err(GoalError::Invalid(ValidationError::Required { field: "name" }))
        ));
    }

    #[test]
    fn test_view_from_row() {
        let view = GoalView::from(SavingGoal {
            goal_id: 1,
            user_id: 2,
            name: "Rent".to_string(),
            target_amount: Decimal::from(200),
            current_amount: Decimal::from(50),
            due_date: None,
            status: "ahead".to_string(),
            created_at: Utc::now(),
        });
        assert_eq!(view.progress_percent, 25.0);
        assert_eq!(view.status_label, "Ahead");
        assert_eq!(view.target_amount, "200.00");
    }
}
