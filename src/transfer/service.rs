//! Peer-to-peer transfer submission
//!
//! A submission runs in one database transaction:
//!
//! ```text
//! lock sender row ─▶ idempotency lookup ─▶ balance check ─▶ insert transfer
//!                                                              │
//!                        commit ◀─ credit recipient ◀─ debit sender (amount + fee)
//! ```
//!
//! Any error before commit drops the transaction, which rolls everything back.
//! A reference-number collision restarts the whole transaction with a new code.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::db::{NewTransfer, TransferDb};
use super::error::TransferError;
use super::state::TransferStatus;
use super::types::{TransferReceipt, TransferRecord, TransferRequest, TransferView, ValidatedTransfer};
use crate::account::{CurrencyCode, ProfileRepository, User, UserRepository};
use crate::db::is_unique_violation;
use crate::fee::calculate_fee;
use crate::ledger::{LedgerRepository, NewLedgerEntry, TransactionKind};
use crate::money::{MoneyError, format_money, max_amount, parse_amount};

/// Reference-number allocations tried before giving up
pub const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// Ledger category for both rows of a transfer
pub const TRANSFER_CATEGORY: &str = "Transfer";

/// 8 uppercase hex characters from a random UUID
pub fn new_reference() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_ascii_uppercase()
}

/// Input checks, in the order users see them: amount, currency.
/// Recipient checks need the database and happen in [`TransferService::submit`].
pub fn validate_transfer(req: &TransferRequest) -> Result<ValidatedTransfer, TransferError> {
    let raw_amount = req
        .amount
        .as_ref()
        .map(|a| a.as_str().trim())
        .filter(|s| !s.is_empty())
        .ok_or(TransferError::MissingAmount)?;

    let amount = match parse_amount(raw_amount) {
        Ok(v) => v,
        Err(MoneyError::Negative) => return Err(TransferError::NonPositiveAmount),
        Err(_) => return Err(TransferError::InvalidAmount),
    };
    if amount <= Decimal::ZERO {
        return Err(TransferError::NonPositiveAmount);
    }

    let quote = calculate_fee(amount);
    if quote.total_amount > max_amount() {
        return Err(TransferError::InvalidAmount);
    }

    let currency = CurrencyCode::or_default(req.currency.as_deref())
        .map_err(|e| TransferError::InvalidCurrency(e.to_string()))?;

    let idempotency_key = match req.idempotency_key.as_deref().map(str::trim) {
        Some("") => return Err(TransferError::InvalidIdempotencyKey),
        Some(k) => Some(k.to_string()),
        None => None,
    };

    Ok(ValidatedTransfer {
        recipient_phone: req
            .recipient_phone
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string(),
        amount: quote.amount,
        service_fee: quote.service_fee,
        total_amount: quote.total_amount,
        currency: currency.into_string(),
        description: req.description.as_deref().unwrap_or_default().trim().to_string(),
        idempotency_key,
    })
}

/// Width of `transactions_tb.description`, in characters
pub const LEDGER_DESCRIPTION_MAX: usize = 255;

/// `"Transfer to bob: rent"`, or `"Transfer to bob"` without a description.
/// Cut to [`LEDGER_DESCRIPTION_MAX`] characters.
fn ledger_description(direction: &str, counterparty: &str, description: &str) -> String {
    let full = if description.is_empty() {
        format!("Transfer {} {}", direction, counterparty)
    } else {
        format!("Transfer {} {}: {}", direction, counterparty, description)
    };
    match full.char_indices().nth(LEDGER_DESCRIPTION_MAX) {
        Some((cut, _)) => full[..cut].to_string(),
        None => full,
    }
}

enum Attempt {
    Created(TransferRecord),
    Replayed(TransferRecord),
    Collision,
}

/// Transfer service
#[derive(Clone)]
pub struct TransferService {
    db: TransferDb,
    require_sufficient_balance: bool,
}

impl TransferService {
    pub fn new(pool: PgPool, require_sufficient_balance: bool) -> Self {
        Self {
            db: TransferDb::new(pool),
            require_sufficient_balance,
        }
    }

    pub fn db(&self) -> &TransferDb {
        &self.db
    }

    /// Validate and execute a transfer from `sender_id`.
    pub async fn submit(
        &self,
        sender_id: i64,
        req: &TransferRequest,
    ) -> Result<TransferReceipt, TransferError> {
        let t = validate_transfer(req)?;
        let pool = self.db.pool();

        let sender = UserRepository::get_by_id(pool, sender_id)
            .await?
            .ok_or(TransferError::SenderNotFound)?;

        if t.recipient_phone.is_empty() {
            return Err(TransferError::RecipientNotFound);
        }
        let (recipient_profile, recipient) =
            ProfileRepository::find_by_phone(pool, &t.recipient_phone)
                .await?
                .ok_or(TransferError::RecipientNotFound)?;
        if recipient.user_id == sender_id {
            return Err(TransferError::SameAccount);
        }
        if !recipient_profile.is_active {
            return Err(TransferError::RecipientInactive);
        }

        let sender_profile = ProfileRepository::ensure_profile(pool, &sender).await?;
        if !sender_profile.is_active {
            return Err(TransferError::SenderInactive);
        }

        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            let reference = new_reference();
            match self.try_submit(&sender, &recipient, &t, &reference).await? {
                Attempt::Created(record) => {
                    tracing::info!(
                        user_id = sender_id,
                        recipient_id = recipient.user_id,
                        reference = %record.reference_number,
                        amount = %record.amount,
                        fee = %record.service_fee,
                        currency = %record.currency,
                        "transfer completed"
                    );
                    return Ok(TransferReceipt::new(&record, &recipient.username, false));
                }
                Attempt::Replayed(record) => {
                    tracing::info!(
                        user_id = sender_id,
                        reference = %record.reference_number,
                        "idempotent transfer replayed"
                    );
                    let recipient_name = match UserRepository::get_by_id(pool, record.recipient_id).await? {
                        Some(u) => u.username,
                        None => recipient.username.clone(),
                    };
                    return Ok(TransferReceipt::new(&record, &recipient_name, true));
                }
                Attempt::Collision => {
                    tracing::warn!(attempt, reference = %reference, "reference number collision, retrying");
                }
            }
        }

        Err(TransferError::ReferenceExhausted)
    }

    async fn try_submit(
        &self,
        sender: &User,
        recipient: &User,
        t: &ValidatedTransfer,
        reference: &str,
    ) -> Result<Attempt, TransferError> {
        let mut tx = self.db.pool().begin().await?;

        TransferDb::lock_sender(&mut tx, sender.user_id).await?;

        if let Some(key) = t.idempotency_key.as_deref() {
            if let Some(existing) =
                TransferDb::find_by_idempotency_key(&mut tx, sender.user_id, key).await?
            {
                tx.rollback().await?;
                return Ok(Attempt::Replayed(existing));
            }
        }

        if self.require_sufficient_balance {
            let available = LedgerRepository::balance(&mut tx, sender.user_id, &t.currency).await?;
            if available < t.total_amount {
                return Err(TransferError::InsufficientBalance {
                    available: format_money(available),
                    required: format_money(t.total_amount),
                    currency: t.currency.clone(),
                });
            }
        }

        let insert = TransferDb::insert(
            &mut tx,
            &NewTransfer {
                sender_id: sender.user_id,
                recipient_id: recipient.user_id,
                amount: t.amount,
                currency: &t.currency,
                service_fee: t.service_fee,
                total_amount: t.total_amount,
                description: &t.description,
                status: TransferStatus::Completed,
                reference_number: reference,
                idempotency_key: t.idempotency_key.as_deref(),
            },
        )
        .await;

        let record = match insert {
            Ok(record) => record,
            Err(e) if is_unique_violation(&e, Some("transfers_reference_uq")) => {
                return Ok(Attempt::Collision);
            }
            Err(e) => return Err(e.into()),
        };

        LedgerRepository::insert(
            &mut tx,
            &NewLedgerEntry {
                user_id: sender.user_id,
                description: ledger_description("to", &recipient.username, &t.description),
                amount: t.total_amount,
                currency: t.currency.clone(),
                kind: TransactionKind::TransferOut,
                category: TRANSFER_CATEGORY.to_string(),
                occurred_at: None,
                transfer_id: Some(record.transfer_id),
            },
        )
        .await?;

        LedgerRepository::insert(
            &mut tx,
            &NewLedgerEntry {
                user_id: recipient.user_id,
                description: ledger_description("from", &sender.username, &t.description),
                amount: t.amount,
                currency: t.currency.clone(),
                kind: TransactionKind::TransferIn,
                category: TRANSFER_CATEGORY.to_string(),
                occurred_at: None,
                transfer_id: Some(record.transfer_id),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Attempt::Created(record))
    }

    /// Sent and received transfers, newest first
    pub async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TransferView>, TransferError> {
        let rows = self.db.list_for_user(user_id, limit).await?;
        Ok(rows.into_iter().map(TransferView::from).collect())
    }

    /// Visible to the sender, the recipient and admins
    pub async fn get_for_user(
        &self,
        user_id: i64,
        is_admin: bool,
        reference: &str,
    ) -> Result<TransferView, TransferError> {
        let reference = reference.trim().to_ascii_uppercase();
        let detail = self
            .db
            .get_by_reference(&reference)
            .await?
            .ok_or_else(|| TransferError::TransferNotFound(reference.clone()))?;

        if !is_admin && !detail.record.involves(user_id) {
            return Err(TransferError::Forbidden);
        }
        Ok(detail.into())
    }

    /// Admin status change; any valid status is accepted
    pub async fn update_status(
        &self,
        transfer_id: i64,
        status: &str,
    ) -> Result<TransferRecord, TransferError> {
        let status = TransferStatus::parse(status)
            .ok_or_else(|| TransferError::InvalidStatus(status.to_string()))?;
        let record = self
            .db
            .update_status(transfer_id, status)
            .await?
            .ok_or_else(|| TransferError::TransferNotFound(transfer_id.to_string()))?;
        tracing::info!(transfer_id, reference = %record.reference_number, status = %status, "transfer status updated");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::AmountInput;

    fn request(amount: Option<&str>) -> TransferRequest {
        TransferRequest {
            recipient_phone: Some(" +254700000001 ".to_string()),
            amount: amount.map(|a| AmountInput(a.to_string())),
            currency: None,
            description: Some(" rent ".to_string()),
            idempotency_key: None,
        }
    }

    #[test]
    fn test_reference_format() {
        let r = new_reference();
        assert_eq!(r.len(), 8);
        assert!(r.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert!(r.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_validate_happy_path() {
        let t = validate_transfer(&request(Some("100"))).unwrap();
        assert_eq!(t.recipient_phone, "+254700000001");
        assert_eq!(t.amount, Decimal::from(100));
        assert_eq!(t.service_fee, Decimal::from(2));
        assert_eq!(t.total_amount, Decimal::from(102));
        assert_eq!(t.currency, "USD");
        assert_eq!(t.description, "rent");
    }

    #[test]
    fn test_validate_amount_errors_in_order() {
        assert!(matches!(
            validate_transfer(&request(None)),
            Err(TransferError::MissingAmount)
        ));
        assert!(matches!(
            validate_transfer(&request(Some("   "))),
            Err(TransferError::MissingAmount)
        ));
        assert!(matches!(
            validate_transfer(&request(Some("abc"))),
            Err(TransferError::InvalidAmount)
        ));
        assert!(matches!(
            validate_transfer(&request(Some("1.001"))),
            Err(TransferError::InvalidAmount)
        ));
        assert!(matches!(
            validate_transfer(&request(Some("0"))),
            Err(TransferError::NonPositiveAmount)
        ));
        assert!(matches!(
            validate_transfer(&request(Some("-10"))),
            Err(TransferError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_validate_total_must_fit_column() {
        assert!(matches!(
            validate_transfer(&request(Some("9999999999.99"))),
            Err(TransferError::InvalidAmount)
        ));
    }

    #[test]
    fn test_validate_currency_and_key() {
        let mut req = request(Some("5"));
        req.currency = Some("kes".to_string());
        assert_eq!(validate_transfer(&req).unwrap().currency, "KES");

        req.currency = Some("K$".to_string());
        assert!(matches!(
            validate_transfer(&req),
            Err(TransferError::InvalidCurrency(_))
        ));

        let mut req = request(Some("5"));
        req.idempotency_key = Some("  ".to_string());
        assert!(matches!(
            validate_transfer(&req),
            Err(TransferError::InvalidIdempotencyKey)
        ));
    }

    #[test]
    fn test_ledger_description() {
        assert_eq!(ledger_description("to", "bob", "rent"), "Transfer to bob: rent");
        assert_eq!(ledger_description("from", "alice", ""), "Transfer from alice");
    }

    #[test]
    fn test_ledger_description_fits_column() {
        let description = "é".repeat(255);
        let username = "u".repeat(150);
        let text = ledger_description("to", &username, &description);
        assert_eq!(text.chars().count(), LEDGER_DESCRIPTION_MAX);
        assert!(text.starts_with("Transfer to uuu"));
        assert!(text.ends_with('é'));

        let short = ledger_description("to", "bob", &"x".repeat(200));
        assert_eq!(short.chars().count(), "Transfer to bob: ".len() + 200);
    }
}
