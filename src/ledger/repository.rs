//! Ledger persistence

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::models::{LedgerEntry, LedgerTotals, NewLedgerEntry};

pub struct LedgerRepository;

impl LedgerRepository {
    /// Insert one row. Runs on a plain connection so it can join an open
    /// transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        entry: &NewLedgerEntry,
    ) -> Result<LedgerEntry, sqlx::Error> {
        sqlx::query_as::<_, LedgerEntry>(
            r#"INSERT INTO transactions_tb
                   (user_id, description, amount, currency, kind, category, occurred_at, transfer_id)
               VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), $8)
               RETURNING transaction_id, user_id, description, amount, currency, kind,
                         category, occurred_at, transfer_id, created_at"#,
        )
        .bind(entry.user_id)
        .bind(&entry.description)
        .bind(entry.amount)
        .bind(&entry.currency)
        .bind(entry.kind.as_str())
        .bind(&entry.category)
        .bind(entry.occurred_at)
        .bind(entry.transfer_id)
        .fetch_one(conn)
        .await
    }

    /// Newest first
    pub async fn recent(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        sqlx::query_as::<_, LedgerEntry>(
            r#"SELECT transaction_id, user_id, description, amount, currency, kind,
                      category, occurred_at, transfer_id, created_at
               FROM transactions_tb
               WHERE user_id = $1
               ORDER BY occurred_at DESC, transaction_id DESC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Ledger rows written for a transfer, sender row first
    pub async fn for_transfer(
        pool: &PgPool,
        transfer_id: i64,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        sqlx::query_as::<_, LedgerEntry>(
            r#"SELECT transaction_id, user_id, description, amount, currency, kind,
                      category, occurred_at, transfer_id, created_at
               FROM transactions_tb
               WHERE transfer_id = $1
               ORDER BY transaction_id"#,
        )
        .bind(transfer_id)
        .fetch_all(pool)
        .await
    }

    /// Incoming and outgoing sums across all currencies
    pub async fn totals(pool: &PgPool, user_id: i64) -> Result<LedgerTotals, sqlx::Error> {
        let (incoming, outgoing) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"SELECT
                   COALESCE(SUM(amount) FILTER (WHERE kind IN ('incoming', 'transfer_in')), 0),
                   COALESCE(SUM(amount) FILTER (WHERE kind IN ('outgoing', 'transfer_out')), 0)
               FROM transactions_tb
               WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(LedgerTotals { incoming, outgoing })
    }

    /// Signed sum of the user's rows in one currency
    pub async fn balance(
        conn: &mut PgConnection,
        user_id: i64,
        currency: &str,
    ) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar::<_, Decimal>(
            r#"SELECT COALESCE(SUM(
                   CASE WHEN kind IN ('incoming', 'transfer_in') THEN amount ELSE -amount END
               ), 0)
               FROM transactions_tb
               WHERE user_id = $1 AND currency = $2"#,
        )
        .bind(user_id)
        .bind(currency)
        .fetch_one(conn)
        .await
    }
}
