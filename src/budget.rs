//! Monthly budget per category
//!
//! One entry per `(user, category, month)`; saving the same category and
//! month again overwrites the amounts. Months are stored as their first day.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::account::validation::{ValidationError, non_blank};
use crate::money::{AmountInput, MoneyError, format_money, parse_amount};

pub const BUDGET_SAVED_MSG: &str = "Budget entry saved.";

/// First day of `date`'s month
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse `YYYY-MM` or `YYYY-MM-DD` into the first day of that month.
pub fn parse_month(value: &str) -> Result<NaiveDate, ValidationError> {
    let v = value.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: "month",
        value: v.to_string(),
        expected: "YYYY-MM",
    };

    if let Ok(date) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        return Ok(month_start(date));
    }
    let (year, month) = v.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Month for a summary: missing or unparseable values fall back to `today`'s month
pub fn month_or_current(value: Option<&str>, today: NaiveDate) -> NaiveDate {
    non_blank(value)
        .and_then(|v| parse_month(v).ok())
        .unwrap_or_else(|| month_start(today))
}

/// `budget_entries_tb` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BudgetEntry {
    pub entry_id: i64,
    pub user_id: i64,
    pub category: String,
    pub planned_amount: Decimal,
    pub actual_amount: Decimal,
    pub month: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl BudgetEntry {
    pub fn variance(&self) -> Decimal {
        self.planned_amount - self.actual_amount
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BudgetEntryView {
    pub entry_id: i64,
    pub category: String,
    #[schema(example = "300.00")]
    pub planned_amount: String,
    #[schema(example = "275.50")]
    pub actual_amount: String,
    /// planned − actual
    #[schema(example = "24.50")]
    pub variance: String,
    pub month: NaiveDate,
}

impl From<BudgetEntry> for BudgetEntryView {
    fn from(e: BudgetEntry) -> Self {
        Self {
            entry_id: e.entry_id,
            variance: format_money(e.variance()),
            planned_amount: format_money(e.planned_amount),
            actual_amount: format_money(e.actual_amount),
            category: e.category,
            month: e.month,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BudgetSummary {
    pub month: NaiveDate,
    pub entries: Vec<BudgetEntryView>,
    pub planned_total: String,
    pub actual_total: String,
    pub variance_total: String,
}

impl BudgetSummary {
    pub fn from_entries(month: NaiveDate, entries: Vec<BudgetEntry>) -> Self {
        let planned: Decimal = entries.iter().map(|e| e.planned_amount).sum();
        let actual: Decimal = entries.iter().map(|e| e.actual_amount).sum();
        Self {
            month,
            entries: entries.into_iter().map(BudgetEntryView::from).collect(),
            planned_total: format_money(planned),
            actual_total: format_money(actual),
            variance_total: format_money(planned - actual),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpsertBudgetRequest {
    #[validate(length(min = 1, max = 80, message = "This field is required (max 80 characters)."))]
    #[schema(example = "Groceries")]
    pub category: String,
    #[schema(value_type = String, example = "300.00")]
    pub planned_amount: AmountInput,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "275.50")]
    pub actual_amount: Option<AmountInput>,
    /// `YYYY-MM` or `YYYY-MM-DD`; defaults to the current month
    #[serde(default)]
    #[schema(example = "2025-03")]
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BudgetQuery {
    /// `YYYY-MM`; missing or invalid means the current month
    pub month: Option<String>,
}

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("{field}: {source}")]
    InvalidAmount {
        field: &'static str,
        source: MoneyError,
    },

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Budget entry not found")]
    EntryNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BudgetError {
    pub fn code(&self) -> &'static str {
        match self {
            BudgetError::InvalidAmount { .. } => "INVALID_AMOUNT",
            BudgetError::Invalid(_) => "INVALID_PARAMETER",
            BudgetError::EntryNotFound => "NOT_FOUND",
            BudgetError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            BudgetError::InvalidAmount { .. } | BudgetError::Invalid(_) => 400,
            BudgetError::EntryNotFound => 404,
            BudgetError::Database(_) => 500,
        }
    }
}

/// Budget values after input checks
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudgetEntry {
    pub category: String,
    pub planned_amount: Decimal,
    pub actual_amount: Decimal,
    pub month: NaiveDate,
}

pub fn validate_entry(
    req: &UpsertBudgetRequest,
    today: NaiveDate,
) -> Result<NewBudgetEntry, BudgetError> {
    let category = non_blank(Some(req.category.as_str()))
        .ok_or(ValidationError::Required { field: "category" })?;
    let planned_amount = parse_amount(req.planned_amount.as_str()).map_err(|source| {
        BudgetError::InvalidAmount {
            field: "planned_amount",
            source,
        }
    })?;
    let actual_amount = match req.actual_amount.as_ref().map(|a| a.as_str().trim()) {
        Some(raw) if !raw.is_empty() => {
            parse_amount(raw).map_err(|source| BudgetError::InvalidAmount {
                field: "actual_amount",
                source,
            })?
        }
        _ => Decimal::ZERO,
    };
    let month = match non_blank(req.month.as_deref()) {
        Some(m) => parse_month(m)?,
        None => month_start(today),
    };

    Ok(NewBudgetEntry {
        category: category.to_string(),
        planned_amount,
        actual_amount,
        month,
    })
}

pub struct BudgetRepository;

impl BudgetRepository {
    pub async fn upsert(
        pool: &PgPool,
        user_id: i64,
        entry: &NewBudgetEntry,
    ) -> Result<BudgetEntry, sqlx::Error> {
        sqlx::query_as::<_, BudgetEntry>(
            r#"INSERT INTO budget_entries_tb (user_id, category, planned_amount, actual_amount, month)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT ON CONSTRAINT budget_entries_uq DO UPDATE SET
                   planned_amount = EXCLUDED.planned_amount,
                   actual_amount = EXCLUDED.actual_amount,
                   updated_at = NOW()
               RETURNING entry_id, user_id, category, planned_amount, actual_amount,
                         month, created_at"#,
        )
        .bind(user_id)
        .bind(&entry.category)
        .bind(entry.planned_amount)
        .bind(entry.actual_amount)
        .bind(entry.month)
        .fetch_one(pool)
        .await
    }

    pub async fn for_month(
        pool: &PgPool,
        user_id: i64,
        month: NaiveDate,
    ) -> Result<Vec<BudgetEntry>, sqlx::Error> {
        sqlx::query_as::<_, BudgetEntry>(
            r#"SELECT entry_id, user_id, category, planned_amount, actual_amount, month, created_at
               FROM budget_entries_tb
               WHERE user_id = $1 AND month = $2
               ORDER BY category"#,
        )
        .bind(user_id)
        .bind(month)
        .fetch_all(pool)
        .await
    }

    /// Returns false when no entry with that id belongs to the user
    pub async fn delete(pool: &PgPool, user_id: i64, entry_id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(r#"DELETE FROM budget_entries_tb WHERE entry_id = $1 AND user_id = $2"#)
            .bind(entry_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

pub async fn save_entry(
    pool: &PgPool,
    user_id: i64,
    req: &UpsertBudgetRequest,
) -> Result<BudgetEntryView, BudgetError> {
    let entry = validate_entry(req, Utc::now().date_naive())?;
    let row = BudgetRepository::upsert(pool, user_id, &entry).await?;
    tracing::info!(user_id, entry_id = row.entry_id, month = %row.month, "budget entry saved");
    Ok(row.into())
}

pub async fn summary(
    pool: &PgPool,
    user_id: i64,
    month: Option<&str>,
) -> Result<BudgetSummary, BudgetError> {
    let month = month_or_current(month, Utc::now().date_naive());
    let entries = BudgetRepository::for_month(pool, user_id, month).await?;
    Ok(BudgetSummary::from_entries(month, entries))
}

pub async fn delete_entry(pool: &PgPool, user_id: i64, entry_id: i64) -> Result<(), BudgetError> {
    if !BudgetRepository::delete(pool, user_id, entry_id).await? {
        return Err(BudgetError::EntryNotFound);
    }
    tracing::info!(user_id, entry_id, "budget entry deleted");
    Ok(())
}
