//! Matrix position models
//!
//! Position filling is an external capability (database-side allocation);
//! this service only reads positions for the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Slots per level in the referral matrix.
pub const POSITIONS_PER_LEVEL: i16 = 7;

/// One of the seven slots a referred user can occupy on a level.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatrixPosition {
    pub id: Uuid,
    pub user_id: Uuid,
    pub level_number: i16,
    pub position_number: i16,
    pub occupied_by: Option<Uuid>,
    pub occupied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MatrixPosition {
    pub fn is_occupied(&self) -> bool {
        self.occupied_by.is_some()
    }
}
