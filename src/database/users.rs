//! User store queries

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::models::User;
use crate::store::{StoreResult, UserStore};

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_wallet(&self, wallet_address: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE wallet_address = $1")
            .bind(wallet_address)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(
        &self,
        wallet_address: &str,
        referrer_id: Option<Uuid>,
    ) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (wallet_address, referrer_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(wallet_address)
        .bind(referrer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn referral_count(&self, user_id: Uuid) -> StoreResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users WHERE referrer_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}
