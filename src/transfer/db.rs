//! Transfer Database Layer
//!
//! Reads go through the pool. Writes that belong to a submission take a
//! `&mut PgConnection` so the caller controls the surrounding transaction.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::error::TransferError;
use super::state::TransferStatus;
use super::types::{TransferDetail, TransferRecord};

const DETAIL_SELECT: &str = r#"
    SELECT t.*, s.username AS sender_username, r.username AS recipient_username
    FROM transfers_tb t
    JOIN users_tb s ON s.user_id = t.sender_id
    JOIN users_tb r ON r.user_id = t.recipient_id
"#;

/// Row values for a new transfer
pub struct NewTransfer<'a> {
    pub sender_id: i64,
    pub recipient_id: i64,
    pub amount: Decimal,
    pub currency: &'a str,
    pub service_fee: Decimal,
    pub total_amount: Decimal,
    pub description: &'a str,
    pub status: TransferStatus,
    pub reference_number: &'a str,
    pub idempotency_key: Option<&'a str>,
}

/// Transfer database operations
#[derive(Clone)]
pub struct TransferDb {
    pool: PgPool,
}

impl TransferDb {
    /// Create a new TransferDb with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Serialise submissions from one sender by locking their user row
    pub async fn lock_sender(conn: &mut PgConnection, sender_id: i64) -> Result<(), TransferError> {
        sqlx::query("SELECT user_id FROM users_tb WHERE user_id = $1 FOR UPDATE")
            .bind(sender_id)
            .fetch_one(conn)
            .await?;
        Ok(())
    }

    /// Earlier transfer from this sender with the same idempotency key
    pub async fn find_by_idempotency_key(
        conn: &mut PgConnection,
        sender_id: i64,
        key: &str,
    ) -> Result<Option<TransferRecord>, TransferError> {
        let record = sqlx::query_as::<_, TransferRecord>(
            r#"SELECT * FROM transfers_tb WHERE sender_id = $1 AND idempotency_key = $2"#,
        )
        .bind(sender_id)
        .bind(key)
        .fetch_optional(conn)
        .await?;
        Ok(record)
    }

    /// Insert a transfer row. The raw `sqlx::Error` is returned so the
    /// caller can tell a reference collision from other failures.
    pub async fn insert(
        conn: &mut PgConnection,
        t: &NewTransfer<'_>,
    ) -> Result<TransferRecord, sqlx::Error> {
        sqlx::query_as::<_, TransferRecord>(
            r#"INSERT INTO transfers_tb
                   (sender_id, recipient_id, amount, currency, service_fee, total_amount,
                    description, status, reference_number, idempotency_key)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING *"#,
        )
        .bind(t.sender_id)
        .bind(t.recipient_id)
        .bind(t.amount)
        .bind(t.currency)
        .bind(t.service_fee)
        .bind(t.total_amount)
        .bind(t.description)
        .bind(t.status.as_str())
        .bind(t.reference_number)
        .bind(t.idempotency_key)
        .fetch_one(conn)
        .await
    }

    pub async fn get_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TransferDetail>, TransferError> {
        let sql = format!("{} WHERE t.reference_number = $1", DETAIL_SELECT);
        let detail = sqlx::query_as::<_, TransferDetail>(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(detail)
    }

    /// Sent and received, newest first
    pub async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TransferDetail>, TransferError> {
        let sql = format!(
            "{} WHERE t.sender_id = $1 OR t.recipient_id = $1 \
             ORDER BY t.created_at DESC, t.transfer_id DESC LIMIT $2",
            DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, TransferDetail>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Newest transfers across all users
    pub async fn recent(&self, limit: i64) -> Result<Vec<TransferDetail>, TransferError> {
        let sql = format!(
            "{} ORDER BY t.created_at DESC, t.transfer_id DESC LIMIT $1",
            DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, TransferDetail>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update_status(
        &self,
        transfer_id: i64,
        status: TransferStatus,
    ) -> Result<Option<TransferRecord>, TransferError> {
        let record = sqlx::query_as::<_, TransferRecord>(
            r#"UPDATE transfers_tb SET status = $2, updated_at = NOW()
               WHERE transfer_id = $1
               RETURNING *"#,
        )
        .bind(transfer_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// `(total, completed, pending)` transfer counts
    pub async fn status_counts(&self) -> Result<(i64, i64, i64), TransferError> {
        let counts = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"SELECT COUNT(*),
                      COUNT(*) FILTER (WHERE status = 'completed'),
                      COUNT(*) FILTER (WHERE status = 'pending')
               FROM transfers_tb"#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Sum of service fees on completed transfers
    pub async fn completed_fee_total(&self) -> Result<Decimal, TransferError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"SELECT COALESCE(SUM(service_fee), 0) FROM transfers_tb WHERE status = 'completed'"#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
