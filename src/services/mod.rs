//! Business logic for level checking and purchase confirmation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{AgentLevel, TransactionType, User, MAX_LEVEL, STATUS_COMPLETED};
use crate::store::{MatrixStore, NewLedgerEntry, NewNotification, PurchaseWrite};

/// Checker output: which of levels 1..target still need paying for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchasePlan {
    pub levels_to_purchase: Vec<i16>,
    pub total_cost: Decimal,
    pub already_unlocked: Vec<i16>,
}

impl PurchasePlan {
    pub fn nothing_to_purchase(&self) -> bool {
        self.levels_to_purchase.is_empty()
    }
}

/// Classifies levels 1..=target into already-unlocked and to-purchase,
/// summing the unlock prices of the latter. Pure; `levels` must be the
/// user's full level set.
pub fn plan_purchase(levels: &[AgentLevel], target_level: i16) -> PurchasePlan {
    let mut already_unlocked = Vec::new();
    let mut levels_to_purchase = Vec::new();
    let mut total_cost = Decimal::ZERO;

    for number in 1..=target_level {
        let Some(level) = levels.iter().find(|l| l.level_number == number) else {
            // Initializer guarantees all ten rows; a hole is logged and skipped.
            tracing::warn!("level {} row missing from user level set", number);
            continue;
        };
        if level.is_unlocked {
            already_unlocked.push(number);
        } else {
            levels_to_purchase.push(number);
            total_cost += level.unlock_price;
        }
    }

    PurchasePlan {
        levels_to_purchase,
        total_cost,
        already_unlocked,
    }
}

/// Dashboard header numbers derived from ledger and referral rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub referral_count: i64,
    pub earnings_total: Decimal,
}

/// Checker/confirmer surface the client unlock workflow drives. Implemented
/// in-process by [`LevelService`]; an HTTP client can implement it remotely.
#[async_trait]
pub trait PurchaseApi: Send + Sync {
    async fn check_levels(&self, user_id: Uuid, target_level: i16) -> ApiResult<PurchasePlan>;

    async fn confirm_purchase(
        &self,
        user_id: Uuid,
        levels: &[i16],
        tx_hash: &str,
        total_amount: Decimal,
    ) -> ApiResult<Vec<i16>>;
}

/// Level purchase and dashboard service over a typed store.
pub struct LevelService<S> {
    store: Arc<S>,
}

impl<S> Clone for LevelService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: MatrixStore> LevelService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only level check: no side effects, safe to repeat.
    pub async fn check_levels(&self, user_id: Uuid, target_level: i16) -> ApiResult<PurchasePlan> {
        if !(1..=MAX_LEVEL).contains(&target_level) {
            return Err(ApiError::Validation(format!(
                "target_level must be between 1 and {}, got {}",
                MAX_LEVEL, target_level
            )));
        }

        let levels = self.store.levels_for_user(user_id).await?;
        if levels.is_empty() {
            return Err(ApiError::NotFound(format!(
                "no levels found for user {}",
                user_id
            )));
        }

        Ok(plan_purchase(&levels, target_level))
    }

    /// Marks the given levels unlocked and records the ledger rows and the
    /// notification, all in one store transaction. The payment hash is
    /// trusted as-is; no on-chain confirmation wait.
    pub async fn confirm_purchase(
        &self,
        user_id: Uuid,
        levels: &[i16],
        tx_hash: &str,
        total_amount: Decimal,
    ) -> ApiResult<Vec<i16>> {
        if levels.is_empty() {
            return Err(ApiError::Validation("levels must not be empty".to_string()));
        }
        if let Some(bad) = levels.iter().find(|n| !(1..=MAX_LEVEL).contains(*n)) {
            return Err(ApiError::Validation(format!(
                "level {} is out of range 1..{}",
                bad, MAX_LEVEL
            )));
        }
        if tx_hash.is_empty() {
            return Err(ApiError::Validation("tx_hash must not be empty".to_string()));
        }
        if total_amount <= Decimal::ZERO {
            return Err(ApiError::Validation(
                "total_amount must be positive".to_string(),
            ));
        }

        // Even split of the paid amount across the unlocked levels.
        let share = total_amount / Decimal::from(levels.len() as u64);
        let ledger = levels
            .iter()
            .map(|&level| NewLedgerEntry {
                user_id,
                transaction_type: TransactionType::Purchase.as_str().to_string(),
                amount: share,
                level_number: level,
                tx_hash: tx_hash.to_string(),
                status: STATUS_COMPLETED.to_string(),
                description: format!("Unlocked agent level {}", level),
            })
            .collect();

        let joined = levels
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let notification = NewNotification {
            user_id,
            title: "Levels unlocked".to_string(),
            message: format!("Successfully unlocked levels: {}", joined),
            notification_type: TransactionType::Purchase.as_str().to_string(),
        };

        let write = PurchaseWrite {
            user_id,
            levels: levels.to_vec(),
            unlocked_at: Utc::now(),
            ledger,
            notification,
        };
        self.store.apply_purchase(&write).await?;

        tracing::info!(
            user_id = %user_id,
            tx_hash = %tx_hash,
            "purchase confirmed for levels: {}",
            joined
        );
        Ok(levels.to_vec())
    }

    /// Finds or creates the user row for a wallet; new users get their ten
    /// level rows initialized with the price schedule.
    pub async fn register_user(
        &self,
        wallet_address: &str,
        referrer_id: Option<Uuid>,
    ) -> ApiResult<User> {
        let wallet = wallet_address.trim().to_lowercase();
        if wallet.is_empty() {
            return Err(ApiError::Validation(
                "wallet_address must not be empty".to_string(),
            ));
        }

        if let Some(existing) = self.store.find_user_by_wallet(&wallet).await? {
            return Ok(existing);
        }

        let user = self.store.create_user(&wallet, referrer_id).await?;
        self.store.initialize_levels(user.id).await?;
        tracing::info!(user_id = %user.id, wallet = %wallet, "registered new user");
        Ok(user)
    }

    pub async fn dashboard_summary(&self, user_id: Uuid) -> ApiResult<DashboardSummary> {
        let referral_count = self.store.referral_count(user_id).await?;
        let earnings_total = self.store.earnings_total(user_id).await?;
        Ok(DashboardSummary {
            referral_count,
            earnings_total,
        })
    }
}

#[async_trait]
impl<S: MatrixStore> PurchaseApi for LevelService<S> {
    async fn check_levels(&self, user_id: Uuid, target_level: i16) -> ApiResult<PurchasePlan> {
        LevelService::check_levels(self, user_id, target_level).await
    }

    async fn confirm_purchase(
        &self,
        user_id: Uuid,
        levels: &[i16],
        tx_hash: &str,
        total_amount: Decimal,
    ) -> ApiResult<Vec<i16>> {
        LevelService::confirm_purchase(self, user_id, levels, tx_hash, total_amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::unlock_price_for;
    use crate::store::memory::MemoryStore;
    use crate::store::AgentLevelStore;

    fn level_set(unlocked: &[i16]) -> Vec<AgentLevel> {
        (1..=MAX_LEVEL)
            .map(|n| AgentLevel {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                level_number: n,
                unlock_price: unlock_price_for(n),
                is_unlocked: unlocked.contains(&n),
                unlocked_at: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn plan_splits_target_range_into_unlocked_and_to_purchase() {
        let levels = level_set(&[1, 3]);
        let plan = plan_purchase(&levels, 5);
        assert_eq!(plan.already_unlocked, vec![1, 3]);
        assert_eq!(plan.levels_to_purchase, vec![2, 4, 5]);
        let expected = unlock_price_for(2) + unlock_price_for(4) + unlock_price_for(5);
        assert_eq!(plan.total_cost, expected);
    }

    #[test]
    fn plan_ignores_levels_above_target() {
        let levels = level_set(&[]);
        let plan = plan_purchase(&levels, 1);
        assert_eq!(plan.levels_to_purchase, vec![1]);
        assert_eq!(plan.total_cost, unlock_price_for(1));
    }

    #[test]
    fn plan_matches_doubling_scenario() {
        // Level 1 unlocked; levels 2 and 3 cost 0.02 and 0.04.
        let levels = level_set(&[1]);
        let plan = plan_purchase(&levels, 3);
        assert_eq!(plan.already_unlocked, vec![1]);
        assert_eq!(plan.levels_to_purchase, vec![2, 3]);
        assert_eq!(plan.total_cost.to_string(), "0.06");
    }

    #[tokio::test]
    async fn check_levels_rejects_out_of_range_target() {
        let service = LevelService::new(Arc::new(MemoryStore::new()));
        for target in [0, 11] {
            let err = service.check_levels(Uuid::new_v4(), target).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn check_levels_404_for_uninitialized_user() {
        let service = LevelService::new(Arc::new(MemoryStore::new()));
        let err = service.check_levels(Uuid::new_v4(), 3).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn check_levels_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user("0xabc", &[1, 2]);
        let service = LevelService::new(store);

        let first = service.check_levels(user.id, 5).await.unwrap();
        let second = service.check_levels(user.id, 5).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn confirm_splits_amount_evenly_across_levels() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user("0xabc", &[1, 2]);
        let service = LevelService::new(store.clone());

        let unlocked = service
            .confirm_purchase(user.id, &[3, 4], "0xhash", Decimal::from(100))
            .await
            .unwrap();
        assert_eq!(unlocked, vec![3, 4]);

        let rows = store.ledger_rows();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.amount, Decimal::from(50));
            assert_eq!(row.transaction_type, "purchase");
            assert_eq!(row.status, "completed");
            assert_eq!(row.tx_hash.as_deref(), Some("0xhash"));
        }

        let notes = store.notification_rows();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("3, 4"));
    }

    #[tokio::test]
    async fn confirmed_levels_show_as_unlocked_on_recheck() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user("0xabc", &[]);
        let service = LevelService::new(store);

        service
            .confirm_purchase(user.id, &[1, 2], "0xhash", Decimal::new(3, 2))
            .await
            .unwrap();

        let plan = service.check_levels(user.id, 2).await.unwrap();
        assert!(plan.nothing_to_purchase());
        assert_eq!(plan.already_unlocked, vec![1, 2]);
        assert_eq!(plan.total_cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn confirm_rejects_bad_input_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user("0xabc", &[]);
        let service = LevelService::new(store.clone());

        let cases: Vec<ApiError> = vec![
            service
                .confirm_purchase(user.id, &[], "0xhash", Decimal::ONE)
                .await
                .unwrap_err(),
            service
                .confirm_purchase(user.id, &[11], "0xhash", Decimal::ONE)
                .await
                .unwrap_err(),
            service
                .confirm_purchase(user.id, &[1], "", Decimal::ONE)
                .await
                .unwrap_err(),
            service
                .confirm_purchase(user.id, &[1], "0xhash", Decimal::ZERO)
                .await
                .unwrap_err(),
        ];
        for err in cases {
            assert!(matches!(err, ApiError::Validation(_)));
        }
        assert!(store.ledger_rows().is_empty());
        assert!(store.notification_rows().is_empty());
    }

    #[tokio::test]
    async fn double_confirm_conflicts_and_leaves_no_duplicate_ledger_rows() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user("0xabc", &[]);
        let service = LevelService::new(store.clone());

        service
            .confirm_purchase(user.id, &[3], "0xaaa", Decimal::new(4, 2))
            .await
            .unwrap();
        let err = service
            .confirm_purchase(user.id, &[3], "0xbbb", Decimal::new(4, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(store.ledger_rows().len(), 1);
    }

    #[tokio::test]
    async fn register_is_idempotent_per_wallet() {
        let service = LevelService::new(Arc::new(MemoryStore::new()));
        let first = service.register_user("0xAbC ", None).await.unwrap();
        let second = service.register_user("0xabc", None).await.unwrap();
        assert_eq!(first.id, second.id);

        let levels = service.store().levels_for_user(first.id).await.unwrap();
        assert_eq!(levels.len(), MAX_LEVEL as usize);
        assert!(levels.iter().all(|l| !l.is_unlocked));
    }

    #[tokio::test]
    async fn summary_counts_referrals_and_earnings() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user("0xabc", &[1]);
        store.seed_earning(user.id, Decimal::new(5, 2), 1);
        store.seed_earning(user.id, Decimal::new(3, 2), 1);
        let service = LevelService::new(store.clone());

        let referred = service
            .register_user("0xdef", Some(user.id))
            .await
            .unwrap();
        assert_eq!(referred.referrer_id, Some(user.id));

        let summary = service.dashboard_summary(user.id).await.unwrap();
        assert_eq!(summary.referral_count, 1);
        assert_eq!(summary.earnings_total.to_string(), "0.08");
    }
}
