//! Ledger store queries

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::models::{LedgerEntry, TransactionType};
use crate::store::{StoreResult, TransactionStore};

#[async_trait]
impl TransactionStore for Database {
    async fn recent_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn earnings_total(&self, user_id: Uuid) -> StoreResult<Decimal> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) as total
            FROM transactions
            WHERE user_id = $1 AND transaction_type = $2
            "#,
        )
        .bind(user_id)
        .bind(TransactionType::Earning.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("total"))
    }
}
