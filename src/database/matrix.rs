//! Matrix position store queries (read-only; allocation is external)

use async_trait::async_trait;
use uuid::Uuid;

use super::Database;
use crate::models::MatrixPosition;
use crate::store::{MatrixPositionStore, StoreResult};

#[async_trait]
impl MatrixPositionStore for Database {
    async fn positions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MatrixPosition>> {
        let positions = sqlx::query_as::<_, MatrixPosition>(
            r#"
            SELECT * FROM matrix_positions
            WHERE user_id = $1
            ORDER BY level_number, position_number
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(positions)
    }
}
