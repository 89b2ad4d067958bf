//! Atomic purchase write
//!
//! The unlock update, ledger inserts, and notification insert share one
//! transaction: either the whole purchase lands or none of it does.

use async_trait::async_trait;

use super::Database;
use crate::store::{PurchaseStore, PurchaseWrite, StoreError, StoreResult};

#[async_trait]
impl PurchaseStore for Database {
    async fn apply_purchase(&self, write: &PurchaseWrite) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        // Optimistic guard: only rows still locked count. A concurrent
        // confirmation of the same level makes the counts disagree and the
        // whole purchase rolls back.
        let result = sqlx::query(
            r#"
            UPDATE agent_levels
            SET is_unlocked = TRUE, unlocked_at = $3
            WHERE user_id = $1
              AND level_number = ANY($2)
              AND is_unlocked = FALSE
            "#,
        )
        .bind(write.user_id)
        .bind(&write.levels)
        .bind(write.unlocked_at)
        .execute(&mut *tx)
        .await?;

        let unlocked = result.rows_affected() as usize;
        if unlocked != write.levels.len() {
            tx.rollback().await?;
            return Err(StoreError::UnlockConflict {
                expected: write.levels.len(),
                actual: unlocked,
            });
        }

        for entry in &write.ledger {
            sqlx::query(
                r#"
                INSERT INTO transactions (
                    user_id, transaction_type, amount, level_number,
                    tx_hash, status, description
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(entry.user_id)
            .bind(&entry.transaction_type)
            .bind(entry.amount)
            .bind(entry.level_number)
            .bind(&entry.tx_hash)
            .bind(&entry.status)
            .bind(&entry.description)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, message, notification_type)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(write.notification.user_id)
        .bind(&write.notification.title)
        .bind(&write.notification.message)
        .bind(&write.notification.notification_type)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
