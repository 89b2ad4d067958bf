//! In-memory store adapter.
//!
//! Mirrors the Postgres adapter's semantics (including the optimistic
//! unlock guard) so service and API tests can run without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    AgentLevelStore, HealthStore, MatrixPositionStore, NotificationStore, PurchaseStore,
    PurchaseWrite, StoreError, StoreResult, TransactionStore, UserStore,
};
use crate::models::{
    unlock_price_for, AgentLevel, LedgerEntry, MatrixPosition, Notification, TransactionType,
    User, MAX_LEVEL,
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    levels: HashMap<Uuid, Vec<AgentLevel>>,
    positions: HashMap<Uuid, Vec<MatrixPosition>>,
    ledger: Vec<LedgerEntry>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: registered user with all ten level rows, the given
    /// levels pre-unlocked.
    pub fn seed_user(&self, wallet_address: &str, unlocked: &[i16]) -> User {
        let user = User {
            id: Uuid::new_v4(),
            wallet_address: wallet_address.to_string(),
            referrer_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut inner = self.lock();
        let rows = (1..=MAX_LEVEL)
            .map(|n| AgentLevel {
                id: Uuid::new_v4(),
                user_id: user.id,
                level_number: n,
                unlock_price: unlock_price_for(n),
                is_unlocked: unlocked.contains(&n),
                unlocked_at: unlocked.contains(&n).then(Utc::now),
                created_at: Utc::now(),
            })
            .collect();
        inner.levels.insert(user.id, rows);
        inner.users.push(user.clone());
        user
    }

    /// Test helper: mark a matrix position occupied.
    pub fn seed_position(&self, user_id: Uuid, level: i16, position: i16, occupied_by: Uuid) {
        let mut inner = self.lock();
        let slots = inner.positions.entry(user_id).or_default();
        slots.push(MatrixPosition {
            id: Uuid::new_v4(),
            user_id,
            level_number: level,
            position_number: position,
            occupied_by: Some(occupied_by),
            occupied_at: Some(Utc::now()),
            created_at: Utc::now(),
        });
    }

    /// Test helper: append an earning ledger row.
    pub fn seed_earning(&self, user_id: Uuid, amount: Decimal, level: i16) {
        let mut inner = self.lock();
        inner.ledger.push(LedgerEntry {
            id: Uuid::new_v4(),
            user_id,
            transaction_type: TransactionType::Earning.as_str().to_string(),
            amount,
            level_number: level,
            tx_hash: None,
            status: "completed".to_string(),
            description: None,
            from_user_id: None,
            to_user_id: None,
            created_at: Utc::now(),
        });
    }

    pub fn ledger_rows(&self) -> Vec<LedgerEntry> {
        self.lock().ledger.clone()
    }

    pub fn notification_rows(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_wallet(&self, wallet_address: &str) -> StoreResult<Option<User>> {
        let inner = self.lock();
        Ok(inner
            .users
            .iter()
            .find(|u| u.wallet_address == wallet_address)
            .cloned())
    }

    async fn create_user(
        &self,
        wallet_address: &str,
        referrer_id: Option<Uuid>,
    ) -> StoreResult<User> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.wallet_address == wallet_address) {
            return Err(StoreError::Database(format!(
                "duplicate wallet address {wallet_address}"
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            wallet_address: wallet_address.to_string(),
            referrer_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn referral_count(&self, user_id: Uuid) -> StoreResult<i64> {
        let inner = self.lock();
        Ok(inner
            .users
            .iter()
            .filter(|u| u.referrer_id == Some(user_id))
            .count() as i64)
    }
}

#[async_trait]
impl AgentLevelStore for MemoryStore {
    async fn levels_for_user(&self, user_id: Uuid) -> StoreResult<Vec<AgentLevel>> {
        let inner = self.lock();
        let mut rows = inner.levels.get(&user_id).cloned().unwrap_or_default();
        rows.sort_by_key(|l| l.level_number);
        Ok(rows)
    }

    async fn initialize_levels(&self, user_id: Uuid) -> StoreResult<()> {
        let mut inner = self.lock();
        let rows = (1..=MAX_LEVEL)
            .map(|n| AgentLevel {
                id: Uuid::new_v4(),
                user_id,
                level_number: n,
                unlock_price: unlock_price_for(n),
                is_unlocked: false,
                unlocked_at: None,
                created_at: Utc::now(),
            })
            .collect();
        inner.levels.insert(user_id, rows);
        Ok(())
    }
}

#[async_trait]
impl MatrixPositionStore for MemoryStore {
    async fn positions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MatrixPosition>> {
        let inner = self.lock();
        let mut rows = inner.positions.get(&user_id).cloned().unwrap_or_default();
        rows.sort_by_key(|p| (p.level_number, p.position_number));
        Ok(rows)
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn recent_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<LedgerEntry>> {
        let inner = self.lock();
        let mut rows: Vec<_> = inner
            .ledger
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn earnings_total(&self, user_id: Uuid) -> StoreResult<Decimal> {
        let inner = self.lock();
        Ok(inner
            .ledger
            .iter()
            .filter(|t| {
                t.user_id == user_id
                    && t.transaction_type == TransactionType::Earning.as_str()
            })
            .map(|t| t.amount)
            .sum())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn notifications_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let inner = self.lock();
        let mut rows: Vec<_> = inner
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.is_read
                .cmp(&b.is_read)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl PurchaseStore for MemoryStore {
    async fn apply_purchase(&self, write: &PurchaseWrite) -> StoreResult<()> {
        let mut inner = self.lock();
        let rows = inner.levels.get_mut(&write.user_id).map(Vec::as_mut_slice);
        let rows = rows.unwrap_or_default();

        let still_locked = rows
            .iter()
            .filter(|l| write.levels.contains(&l.level_number) && !l.is_unlocked)
            .count();
        if still_locked != write.levels.len() {
            return Err(StoreError::UnlockConflict {
                expected: write.levels.len(),
                actual: still_locked,
            });
        }

        for level in rows {
            if write.levels.contains(&level.level_number) {
                level.is_unlocked = true;
                level.unlocked_at = Some(write.unlocked_at);
            }
        }
        for entry in &write.ledger {
            inner.ledger.push(LedgerEntry {
                id: Uuid::new_v4(),
                user_id: entry.user_id,
                transaction_type: entry.transaction_type.clone(),
                amount: entry.amount,
                level_number: entry.level_number,
                tx_hash: Some(entry.tx_hash.clone()),
                status: entry.status.clone(),
                description: Some(entry.description.clone()),
                from_user_id: None,
                to_user_id: None,
                created_at: write.unlocked_at,
            });
        }
        inner.notifications.push(Notification {
            id: Uuid::new_v4(),
            user_id: write.notification.user_id,
            title: write.notification.title.clone(),
            message: write.notification.message.clone(),
            notification_type: write.notification.notification_type.clone(),
            is_read: false,
            created_at: write.unlocked_at,
        });
        Ok(())
    }
}
