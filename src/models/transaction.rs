//! Ledger models
//!
//! Ledger rows are append-only: never mutated after insert.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger row kind, stored as text in the `transactions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Purchase,
    Earning,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::Earning => "earning",
        }
    }
}

/// Terminal status written by the purchase confirmer.
pub const STATUS_COMPLETED: &str = "completed";

/// Append-only ledger row for a purchase or earning event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: String,
    pub amount: Decimal,
    pub level_number: i16,
    pub tx_hash: Option<String>,
    pub status: String,
    pub description: Option<String>,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
