//! Recording user-entered transactions

use sqlx::PgPool;
use thiserror::Error;

use super::models::{CreateTransactionRequest, NewLedgerEntry, TransactionKind, TransactionView};
use super::repository::LedgerRepository;
use crate::account::validation::{CurrencyCode, ValidationError, non_blank, parse_timestamp};
use crate::money::{MoneyError, parse_amount};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::Invalid(_) => "INVALID_PARAMETER",
            LedgerError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidAmount(_) | LedgerError::Invalid(_) => 400,
            LedgerError::Database(_) => 500,
        }
    }
}

/// Turn a create request into a row for `user_id`.
pub fn build_entry(
    user_id: i64,
    req: CreateTransactionRequest,
) -> Result<NewLedgerEntry, LedgerError> {
    let amount = parse_amount(req.amount.as_str())?;
    let currency = CurrencyCode::or_default(req.currency.as_deref())?;

    let kind = match non_blank(req.kind.as_deref()) {
        Some(k) => k.parse::<TransactionKind>().map_err(|_| ValidationError::InvalidChoice {
            field: "kind",
            value: k.to_string(),
        })?,
        None => TransactionKind::Outgoing,
    };

    let occurred_at = match non_blank(req.occurred_at.as_deref()) {
        Some(ts) => Some(parse_timestamp("occurred_at", ts)?),
        None => None,
    };

    Ok(NewLedgerEntry {
        user_id,
        description: req.description.trim().to_string(),
        amount,
        currency: currency.into_string(),
        kind,
        category: req.category.unwrap_or_default().trim().to_string(),
        occurred_at,
        transfer_id: None,
    })
}

/// Validate and store a transaction for the current user
pub async fn record_transaction(
    pool: &PgPool,
    user_id: i64,
    req: CreateTransactionRequest,
) -> Result<TransactionView, LedgerError> {
    let entry = build_entry(user_id, req)?;
    let mut conn = pool.acquire().await?;
    let row = LedgerRepository::insert(&mut conn, &entry).await?;
    tracing::info!(user_id, transaction_id = row.transaction_id, kind = %entry.kind, "transaction recorded");
    Ok(row.into())
}
