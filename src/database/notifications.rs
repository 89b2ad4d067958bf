//! Notification store queries

use async_trait::async_trait;
use uuid::Uuid;

use super::Database;
use crate::models::Notification;
use crate::store::{NotificationStore, StoreResult};

#[async_trait]
impl NotificationStore for Database {
    async fn notifications_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY is_read ASC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }
}
