//! Agent level models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest purchasable agent level.
pub const MAX_LEVEL: i16 = 10;

/// One unlock tier for one user. Created by the level initializer at
/// registration time and mutated only by the purchase confirmer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgentLevel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub level_number: i16,
    pub unlock_price: Decimal,
    pub is_unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Price schedule: level 1 costs 0.01 BNB and each level doubles the
/// previous one (level 10 = 5.12 BNB).
pub fn unlock_price_for(level_number: i16) -> Decimal {
    debug_assert!((1..=MAX_LEVEL).contains(&level_number));
    Decimal::new(1i64 << (level_number - 1), 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_schedule_doubles() {
        assert_eq!(unlock_price_for(1).to_string(), "0.01");
        assert_eq!(unlock_price_for(2).to_string(), "0.02");
        assert_eq!(unlock_price_for(3).to_string(), "0.04");
        assert_eq!(unlock_price_for(4).to_string(), "0.08");
        assert_eq!(unlock_price_for(10).to_string(), "5.12");
    }
}
