//! Agent level store queries

use async_trait::async_trait;
use uuid::Uuid;

use super::Database;
use crate::models::{unlock_price_for, AgentLevel, MAX_LEVEL};
use crate::store::{AgentLevelStore, StoreResult};

#[async_trait]
impl AgentLevelStore for Database {
    async fn levels_for_user(&self, user_id: Uuid) -> StoreResult<Vec<AgentLevel>> {
        let levels = sqlx::query_as::<_, AgentLevel>(
            "SELECT * FROM agent_levels WHERE user_id = $1 ORDER BY level_number",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(levels)
    }

    async fn initialize_levels(&self, user_id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for level_number in 1..=MAX_LEVEL {
            sqlx::query(
                r#"
                INSERT INTO agent_levels (user_id, level_number, unlock_price)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, level_number) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(level_number)
            .bind(unlock_price_for(level_number))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
