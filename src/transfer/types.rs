//! Transfer request/record types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::state::TransferStatus;
use crate::money::{AmountInput, format_money};

/// Transfer submission (JSON or form)
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct TransferRequest {
    #[serde(default)]
    #[schema(example = "+254712345678")]
    pub recipient_phone: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "100.00")]
    pub amount: Option<AmountInput>,
    /// Defaults to USD
    #[serde(default)]
    #[schema(example = "USD")]
    pub currency: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    #[schema(example = "School fees")]
    pub description: Option<String>,
    /// Client token; resubmitting with the same key returns the first result
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub idempotency_key: Option<String>,
}

/// Transfer request after input checks
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTransfer {
    pub recipient_phone: String,
    pub amount: Decimal,
    pub service_fee: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub description: String,
    pub idempotency_key: Option<String>,
}

/// `transfers_tb` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransferRecord {
    pub transfer_id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub service_fee: Decimal,
    pub total_amount: Decimal,
    pub description: String,
    pub status: String,
    pub reference_number: String,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransferRecord {
    /// Unknown stored values read as pending
    pub fn status(&self) -> TransferStatus {
        TransferStatus::parse(&self.status).unwrap_or(TransferStatus::Pending)
    }

    pub fn involves(&self, user_id: i64) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }
}

/// Transfer row joined with both usernames
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransferDetail {
    #[sqlx(flatten)]
    pub record: TransferRecord,
    pub sender_username: String,
    pub recipient_username: String,
}

/// Transfer as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferView {
    pub transfer_id: i64,
    #[schema(example = "9F3A1C07")]
    pub reference_number: String,
    pub sender: String,
    pub recipient: String,
    #[schema(example = "100.00")]
    pub amount: String,
    #[schema(example = "2.00")]
    pub service_fee: String,
    #[schema(example = "102.00")]
    pub total_amount: String,
    pub currency: String,
    pub description: String,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
}

impl From<TransferDetail> for TransferView {
    fn from(d: TransferDetail) -> Self {
        let status = d.record.status();
        Self {
            transfer_id: d.record.transfer_id,
            reference_number: d.record.reference_number,
            sender: d.sender_username,
            recipient: d.recipient_username,
            amount: format_money(d.record.amount),
            service_fee: format_money(d.record.service_fee),
            total_amount: format_money(d.record.total_amount),
            currency: d.record.currency,
            description: d.record.description,
            status,
            created_at: d.record.created_at,
        }
    }
}

/// Result of a submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferReceipt {
    #[schema(example = "9F3A1C07")]
    pub reference_number: String,
    #[schema(example = "100.00")]
    pub amount: String,
    #[schema(example = "2.00")]
    pub service_fee: String,
    #[schema(example = "102.00")]
    pub total_amount: String,
    pub currency: String,
    pub recipient: String,
    pub status: TransferStatus,
    /// True when an earlier transfer with the same idempotency key was returned
    pub replayed: bool,
}

impl TransferReceipt {
    pub fn new(record: &TransferRecord, recipient: &str, replayed: bool) -> Self {
        Self {
            reference_number: record.reference_number.clone(),
            amount: format_money(record.amount),
            service_fee: format_money(record.service_fee),
            total_amount: format_money(record.total_amount),
            currency: record.currency.clone(),
            recipient: recipient.to_string(),
            status: record.status(),
            replayed,
        }
    }

    /// Confirmation shown to the sender
    pub fn message(&self) -> String {
        format!(
            "Successfully sent {} {} to {}. Service fee: {} {}. Reference: {}",
            self.amount,
            self.currency,
            self.recipient,
            self.service_fee,
            self.currency,
            self.reference_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TransferRecord {
        TransferRecord {
            transfer_id: 1,
            sender_id: 10,
            recipient_id: 20,
            amount: Decimal::from(100),
            currency: "USD".to_string(),
            service_fee: Decimal::from(2),
            total_amount: Decimal::from(102),
            description: "rent".to_string(),
            status: "completed".to_string(),
            reference_number: "AB12CD34".to_string(),
            idempotency_key: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_receipt_message() {
        let receipt = TransferReceipt::new(&record(), "bob", false);
        assert_eq!(
            receipt.message(),
            "Successfully sent 100.00 USD to bob. Service fee: 2.00 USD. Reference: AB12CD34"
        );
        assert_eq!(receipt.status, TransferStatus::Completed);
    }

    #[test]
    fn test_involves() {
        let r = record();
        assert!(r.involves(10));
        assert!(r.involves(20));
        assert!(!r.involves(30));
    }

    #[test]
    fn test_view_from_detail() {
        let view = TransferView::from(TransferDetail {
            record: record(),
            sender_username: "alice".to_string(),
            recipient_username: "bob".to_string(),
        });
        assert_eq!(view.sender, "alice");
        assert_eq!(view.total_amount, "102.00");
    }

    #[test]
    fn test_request_validation() {
        let req = TransferRequest {
            idempotency_key: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(TransferRequest::default().validate().is_ok());
    }
}
