//! Ledger row types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::money::{AmountInput, format_money};

/// Direction of a ledger row
///
/// Amounts are stored as non-negative magnitudes; the kind gives the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Incoming,
    Outgoing,
    TransferIn,
    TransferOut,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Incoming => "incoming",
            TransactionKind::Outgoing => "outgoing",
            TransactionKind::TransferIn => "transfer_in",
            TransactionKind::TransferOut => "transfer_out",
        }
    }

    /// Money coming in
    #[inline]
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Incoming | TransactionKind::TransferIn)
    }

    /// Apply the kind's sign to a magnitude
    pub fn signed(&self, amount: Decimal) -> Decimal {
        if self.is_credit() { amount } else { -amount }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Incoming => "Incoming",
            TransactionKind::Outgoing => "Outgoing",
            TransactionKind::TransferIn => "Transfer In",
            TransactionKind::TransferOut => "Transfer Out",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incoming" => Ok(TransactionKind::Incoming),
            "outgoing" => Ok(TransactionKind::Outgoing),
            "transfer_in" => Ok(TransactionKind::TransferIn),
            "transfer_out" => Ok(TransactionKind::TransferOut),
            other => Err(format!("unknown transaction kind: {}", other)),
        }
    }
}

/// Stored ledger row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerEntry {
    pub transaction_id: i64,
    pub user_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub kind: String,
    pub category: String,
    pub occurred_at: DateTime<Utc>,
    pub transfer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Unknown stored kinds are treated as outgoing
    pub fn kind(&self) -> TransactionKind {
        self.kind.parse().unwrap_or(TransactionKind::Outgoing)
    }

    pub fn signed_amount(&self) -> Decimal {
        self.kind().signed(self.amount)
    }
}

/// Row to insert
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub user_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub kind: TransactionKind,
    pub category: String,
    pub occurred_at: Option<DateTime<Utc>>,
    pub transfer_id: Option<i64>,
}

/// Ledger row as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionView {
    pub transaction_id: i64,
    pub description: String,
    #[schema(example = "102.00")]
    pub amount: String,
    /// Amount with direction, e.g. `-102.00` or `+100.00`
    #[schema(example = "-102.00")]
    pub signed_amount: String,
    pub currency: String,
    pub kind: TransactionKind,
    pub category: String,
    pub occurred_at: DateTime<Utc>,
    pub transfer_id: Option<i64>,
}

impl From<LedgerEntry> for TransactionView {
    fn from(entry: LedgerEntry) -> Self {
        let kind = entry.kind();
        let sign = if kind.is_credit() { "+" } else { "-" };
        Self {
            transaction_id: entry.transaction_id,
            signed_amount: format!("{}{}", sign, format_money(entry.amount)),
            amount: format_money(entry.amount),
            description: entry.description,
            currency: entry.currency,
            kind,
            category: entry.category,
            occurred_at: entry.occurred_at,
            transfer_id: entry.transfer_id,
        }
    }
}

/// Per-user sums across all currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    pub incoming: Decimal,
    pub outgoing: Decimal,
}

impl LedgerTotals {
    pub fn net(&self) -> Decimal {
        self.incoming - self.outgoing
    }
}

/// Create-transaction request
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTransactionRequest {
    #[validate(length(min = 1, max = 255, message = "This field is required (max 255 characters)."))]
    #[schema(example = "Groceries")]
    pub description: String,
    #[schema(value_type = String, example = "45.90")]
    pub amount: AmountInput,
    #[serde(default)]
    #[schema(example = "USD")]
    pub currency: Option<String>,
    /// incoming | outgoing | transfer_in | transfer_out (default outgoing)
    #[serde(default)]
    #[schema(example = "outgoing")]
    pub kind: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    #[schema(example = "Food")]
    pub category: Option<String>,
    /// RFC 3339 or `YYYY-MM-DDTHH:MM`; defaults to now
    #[serde(default)]
    pub occurred_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            TransactionKind::Incoming,
            TransactionKind::Outgoing,
            TransactionKind::TransferIn,
            TransactionKind::TransferOut,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
        assert!("refund".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_kind_sign() {
        let ten = Decimal::from(10);
        assert_eq!(TransactionKind::Incoming.signed(ten), ten);
        assert_eq!(TransactionKind::TransferIn.signed(ten), ten);
        assert_eq!(TransactionKind::Outgoing.signed(ten), -ten);
        assert_eq!(TransactionKind::TransferOut.signed(ten), -ten);
    }

    #[test]
    fn test_view_signed_amount() {
        let entry = LedgerEntry {
            transaction_id: 7,
            user_id: 1,
            description: "Transfer to bob: rent".to_string(),
            amount: Decimal::new(10200, 2),
            currency: "USD".to_string(),
            kind: "transfer_out".to_string(),
            category: "Transfer".to_string(),
            occurred_at: Utc::now(),
            transfer_id: Some(3),
            created_at: Utc::now(),
        };
        let view = TransactionView::from(entry);
        assert_eq!(view.amount, "102.00");
        assert_eq!(view.signed_amount, "-102.00");
        assert_eq!(view.kind, TransactionKind::TransferOut);
    }

    #[test]
    fn test_totals_net() {
        let totals = LedgerTotals {
            incoming: Decimal::new(50000, 2),
            outgoing: Decimal::new(12550, 2),
        };
        assert_eq!(totals.net(), Decimal::new(37450, 2));
    }
}
