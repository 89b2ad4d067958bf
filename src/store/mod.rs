//! Typed store ports, one per entity.
//!
//! The Postgres implementation lives in `crate::database`; `memory` holds
//! the in-memory adapter used by tests and local development.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AgentLevel, LedgerEntry, MatrixPosition, Notification, User};

/// Store-level errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    /// The optimistic unlock guard found fewer locked rows than the
    /// purchase expected (e.g. a second tab already confirmed).
    #[error("unlock conflict: only {actual} of {expected} levels were still locked")]
    UnlockConflict { expected: usize, actual: usize },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// New ledger row prepared by the purchase confirmer.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub user_id: Uuid,
    pub transaction_type: String,
    pub amount: Decimal,
    pub level_number: i16,
    pub tx_hash: String,
    pub status: String,
    pub description: String,
}

/// New notification row prepared by the purchase confirmer.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: String,
}

/// Everything one confirmed purchase writes. Applied atomically by
/// [`PurchaseStore::apply_purchase`].
#[derive(Debug, Clone)]
pub struct PurchaseWrite {
    pub user_id: Uuid,
    pub levels: Vec<i16>,
    pub unlocked_at: DateTime<Utc>,
    pub ledger: Vec<NewLedgerEntry>,
    pub notification: NewNotification,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_wallet(&self, wallet_address: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, wallet_address: &str, referrer_id: Option<Uuid>)
        -> StoreResult<User>;
    async fn referral_count(&self, user_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
pub trait AgentLevelStore: Send + Sync {
    /// All level rows for a user, ordered by level number.
    async fn levels_for_user(&self, user_id: Uuid) -> StoreResult<Vec<AgentLevel>>;

    /// Creates the ten level rows with the doubling price schedule.
    async fn initialize_levels(&self, user_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait MatrixPositionStore: Send + Sync {
    /// Position rows for a user, ordered by (level, position).
    async fn positions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MatrixPosition>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Recent ledger rows for a user, newest first.
    async fn recent_transactions(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<LedgerEntry>>;

    /// Sum of `earning` ledger amounts for a user.
    async fn earnings_total(&self, user_id: Uuid) -> StoreResult<Decimal>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Notifications for a user, unread first, newest first within each group.
    async fn notifications_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Notification>>;
}

#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Cheap liveness probe against the backing storage.
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Applies one confirmed purchase in a single transaction: unlocks the
    /// levels (only rows still locked), appends the ledger rows, and inserts
    /// the notification. Rolls back with [`StoreError::UnlockConflict`] if
    /// any requested level was already unlocked.
    async fn apply_purchase(&self, write: &PurchaseWrite) -> StoreResult<()>;
}

/// Combined store surface consumed by the service layer.
pub trait MatrixStore:
    UserStore
    + AgentLevelStore
    + MatrixPositionStore
    + TransactionStore
    + NotificationStore
    + PurchaseStore
    + HealthStore
{
}

impl<T> MatrixStore for T where
    T: UserStore
        + AgentLevelStore
        + MatrixPositionStore
        + TransactionStore
        + NotificationStore
        + PurchaseStore
        + HealthStore
{
}
