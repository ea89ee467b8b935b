//! Transfer submission against a live PostgreSQL
//!
//! Every scenario counts `transfers_tb` and `transactions_tb` rows for the
//! users involved before and after, so failed submissions are shown to write
//! nothing.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{TransferError, TransferRequest, TransferService, TransferStatus};
use crate::account::{ProfileRepository, User};
use crate::db::test_support::{create_user, test_db, unique_phone};
use crate::ledger::{LedgerRepository, NewLedgerEntry, TransactionKind};
use crate::money::AmountInput;

/// Sender with a balance and a recipient reachable by phone
struct TestHarness {
    pool: PgPool,
    service: TransferService,
    sender: User,
    recipient: User,
    recipient_phone: String,
}

impl TestHarness {
    async fn new(sender_balance: i64) -> Self {
        let db = test_db().await;
        let pool = db.pool().clone();
        let sender = create_user(&pool, "sender", Some(&unique_phone())).await;
        let recipient_phone = unique_phone();
        let recipient = create_user(&pool, "recipient", Some(&recipient_phone)).await;

        if sender_balance > 0 {
            let mut conn = pool.acquire().await.unwrap();
            LedgerRepository::insert(
                &mut conn,
                &NewLedgerEntry {
                    user_id: sender.user_id,
                    description: "Salary".to_string(),
                    amount: Decimal::from(sender_balance),
                    currency: "USD".to_string(),
                    kind: TransactionKind::Incoming,
                    category: "Income".to_string(),
                    occurred_at: None,
                    transfer_id: None,
                },
            )
            .await
            .unwrap();
        }

        Self {
            service: TransferService::new(pool.clone(), true),
            pool,
            sender,
            recipient,
            recipient_phone,
        }
    }

    fn request(&self, amount: &str) -> TransferRequest {
        TransferRequest {
            recipient_phone: Some(self.recipient_phone.clone()),
            amount: Some(AmountInput(amount.to_string())),
            currency: None,
            description: Some("rent".to_string()),
            idempotency_key: None,
        }
    }

    /// (transfer rows, ledger rows) touching sender or recipient
    async fn row_counts(&self) -> (i64, i64) {
        let ids = vec![self.sender.user_id, self.recipient.user_id];
        let transfers: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transfers_tb WHERE sender_id = ANY($1) OR recipient_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_one(&self.pool)
        .await
        .unwrap();
        let ledger: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions_tb WHERE user_id = ANY($1)")
                .bind(&ids)
                .fetch_one(&self.pool)
                .await
                .unwrap();
        (transfers, ledger)
    }
}

// ========================================================================
// Happy Path Tests
// ========================================================================

/// One transfer row, a `transfer_out` of total and a `transfer_in` of amount
#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_transfer_writes_one_record_and_two_ledger_rows() {
    let h = TestHarness::new(500).await;
    let (transfers_before, ledger_before) = h.row_counts().await;

    let receipt = h.service.submit(h.sender.user_id, &h.request("100")).await.unwrap();
    assert_eq!(receipt.amount, "100.00");
    assert_eq!(receipt.service_fee, "2.00");
    assert_eq!(receipt.total_amount, "102.00");
    assert_eq!(receipt.currency, "USD");
    assert_eq!(receipt.recipient, h.recipient.username);
    assert_eq!(receipt.status, TransferStatus::Completed);
    assert!(!receipt.replayed);

    let (transfers_after, ledger_after) = h.row_counts().await;
    assert_eq!(transfers_after, transfers_before + 1);
    assert_eq!(ledger_after, ledger_before + 2);

    let detail = h
        .service
        .db()
        .get_by_reference(&receipt.reference_number)
        .await
        .unwrap()
        .unwrap();
    let rows = LedgerRepository::for_transfer(&h.pool, detail.record.transfer_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].user_id, h.sender.user_id);
    assert_eq!(rows[0].kind(), TransactionKind::TransferOut);
    assert_eq!(rows[0].amount, Decimal::from(102));
    assert_eq!(rows[0].category, "Transfer");
    assert_eq!(rows[0].description, format!("Transfer to {}: rent", h.recipient.username));

    assert_eq!(rows[1].user_id, h.recipient.user_id);
    assert_eq!(rows[1].kind(), TransactionKind::TransferIn);
    assert_eq!(rows[1].amount, Decimal::from(100));
    assert_eq!(rows[1].description, format!("Transfer from {}: rent", h.sender.username));
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_replayed_idempotency_key_writes_nothing() {
    let h = TestHarness::new(500).await;
    let mut req = h.request("100");
    req.idempotency_key = Some(format!("key-{}", h.sender.user_id));

    let first = h.service.submit(h.sender.user_id, &req).await.unwrap();
    let counts_after_first = h.row_counts().await;

    let second = h.service.submit(h.sender.user_id, &req).await.unwrap();
    assert!(second.replayed);
    assert_eq!(second.reference_number, first.reference_number);
    assert_eq!(second.total_amount, first.total_amount);
    assert_eq!(h.row_counts().await, counts_after_first);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_longest_description_fits_ledger() {
    let h = TestHarness::new(500).await;
    let mut req = h.request("10");
    req.description = Some("d".repeat(255));

    let receipt = h.service.submit(h.sender.user_id, &req).await.unwrap();
    let detail = h
        .service
        .db()
        .get_by_reference(&receipt.reference_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.record.description.chars().count(), 255);

    let rows = LedgerRepository::for_transfer(&h.pool, detail.record.transfer_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.description.chars().count() <= 255));
}

// ========================================================================
// Rejections (nothing written)
// ========================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_unknown_or_missing_phone_writes_nothing() {
    let h = TestHarness::new(500).await;
    let before = h.row_counts().await;

    let mut req = h.request("100");
    req.recipient_phone = Some(unique_phone());
    assert!(matches!(
        h.service.submit(h.sender.user_id, &req).await,
        Err(TransferError::RecipientNotFound)
    ));

    req.recipient_phone = None;
    assert!(matches!(
        h.service.submit(h.sender.user_id, &req).await,
        Err(TransferError::RecipientNotFound)
    ));

    assert_eq!(h.row_counts().await, before);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_insufficient_balance_rolls_back() {
    let h = TestHarness::new(50).await;
    let before = h.row_counts().await;

    match h.service.submit(h.sender.user_id, &h.request("100")).await {
        Err(TransferError::InsufficientBalance {
            available,
            required,
            currency,
        }) => {
            assert_eq!(available, "50.00");
            assert_eq!(required, "102.00");
            assert_eq!(currency, "USD");
        }
        other => panic!("expected InsufficientBalance, got {:?}", other.map(|r| r.reference_number)),
    }

    assert_eq!(h.row_counts().await, before);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_send_to_self_rejected() {
    let h = TestHarness::new(500).await;
    let before = h.row_counts().await;

    let profile = ProfileRepository::get_by_user(&h.pool, h.sender.user_id)
        .await
        .unwrap()
        .unwrap();
    let mut req = h.request("10");
    req.recipient_phone = profile.phone_number.clone();

    assert!(matches!(
        h.service.submit(h.sender.user_id, &req).await,
        Err(TransferError::SameAccount)
    ));
    assert_eq!(h.row_counts().await, before);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_inactive_recipient_rejected() {
    let h = TestHarness::new(500).await;
    ProfileRepository::set_active(&h.pool, h.recipient.user_id, false)
        .await
        .unwrap();
    let before = h.row_counts().await;

    assert!(matches!(
        h.service.submit(h.sender.user_id, &h.request("10")).await,
        Err(TransferError::RecipientInactive)
    ));
    assert_eq!(h.row_counts().await, before);
}

#[tokio::test]
#[ignore = "requires PostgreSQL database"]
async fn test_missing_sender_is_auth_failure() {
    let h = TestHarness::new(0).await;
    let before = h.row_counts().await;

    let err = h.service.submit(i64::MAX, &h.request("10")).await.unwrap_err();
    assert!(matches!(err, TransferError::SenderNotFound));
    assert_eq!(err.http_status(), 401);
    assert_eq!(h.row_counts().await, before);
}
