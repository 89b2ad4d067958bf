//! API response types

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AgentLevel, LedgerEntry, MatrixPosition, Notification, User};
use crate::services::{DashboardSummary, PurchasePlan};

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Response for a level check
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckLevelsResponse {
    pub levels_to_purchase: Vec<i16>,
    pub total_cost: f64,
    pub already_unlocked: Vec<i16>,
}

impl From<PurchasePlan> for CheckLevelsResponse {
    fn from(plan: PurchasePlan) -> Self {
        Self {
            levels_to_purchase: plan.levels_to_purchase,
            total_cost: as_f64(plan.total_cost),
            already_unlocked: plan.already_unlocked,
        }
    }
}

/// Response for a confirmed purchase
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmPurchaseResponse {
    pub success: bool,
    pub unlocked_levels: Vec<i16>,
}

/// Response for user registration
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

/// Response for a user's level list
#[derive(Debug, Serialize, Deserialize)]
pub struct LevelsResponse {
    pub levels: Vec<AgentLevel>,
}

/// Response for a user's matrix positions
#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixResponse {
    pub positions: Vec<MatrixPosition>,
}

/// Response for a user's recent transactions
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<LedgerEntry>,
}

/// Response for a user's notifications
#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// Response for the dashboard summary
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub user_id: Uuid,
    pub referral_count: i64,
    pub earnings_total: f64,
}

impl SummaryResponse {
    pub fn new(user_id: Uuid, summary: DashboardSummary) -> Self {
        Self {
            user_id,
            referral_count: summary.referral_count,
            earnings_total: as_f64(summary.earnings_total),
        }
    }
}
