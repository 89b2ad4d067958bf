//! API request handlers

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{responses::*, ApiState};
use crate::error::{ApiError, ApiResult};
use crate::store::MatrixStore;

fn parse_user_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(format!("invalid user id: {}", raw)))
}

/// Request body for a level check
#[derive(Debug, Deserialize)]
pub struct CheckLevelsRequest {
    pub user_id: Option<String>,
    pub target_level: Option<i16>,
}

/// Check which levels up to the target still need purchasing
pub async fn check_levels<S: MatrixStore>(
    State(state): State<ApiState<S>>,
    Json(request): Json<CheckLevelsRequest>,
) -> ApiResult<Json<CheckLevelsResponse>> {
    let user_id = request
        .user_id
        .ok_or_else(|| ApiError::Validation("user_id is required".to_string()))?;
    let target_level = request
        .target_level
        .ok_or_else(|| ApiError::Validation("target_level is required".to_string()))?;

    let user_id = parse_user_id(&user_id)?;
    let plan = state.service.check_levels(user_id, target_level).await?;
    Ok(Json(plan.into()))
}

/// Request body for a purchase confirmation
#[derive(Debug, Deserialize)]
pub struct ConfirmPurchaseRequest {
    pub user_id: Option<String>,
    pub levels: Option<Vec<i16>>,
    pub tx_hash: Option<String>,
    pub total_amount: Option<f64>,
}

/// Record a paid purchase: unlock levels, write ledger rows, notify
pub async fn confirm_purchase<S: MatrixStore>(
    State(state): State<ApiState<S>>,
    Json(request): Json<ConfirmPurchaseRequest>,
) -> ApiResult<Json<ConfirmPurchaseResponse>> {
    let user_id = request
        .user_id
        .ok_or_else(|| ApiError::Validation("user_id is required".to_string()))?;
    let levels = request
        .levels
        .ok_or_else(|| ApiError::Validation("levels is required".to_string()))?;
    let tx_hash = request
        .tx_hash
        .ok_or_else(|| ApiError::Validation("tx_hash is required".to_string()))?;
    let total_amount = request
        .total_amount
        .ok_or_else(|| ApiError::Validation("total_amount is required".to_string()))?;

    let user_id = parse_user_id(&user_id)?;
    let total_amount = Decimal::from_f64(total_amount)
        .ok_or_else(|| ApiError::Validation("total_amount is not a valid number".to_string()))?;

    let unlocked_levels = state
        .service
        .confirm_purchase(user_id, &levels, &tx_hash, total_amount)
        .await?;
    Ok(Json(ConfirmPurchaseResponse {
        success: true,
        unlocked_levels,
    }))
}

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub wallet_address: Option<String>,
    pub referrer_id: Option<Uuid>,
}

/// Find or create the user for a wallet address
pub async fn register_user<S: MatrixStore>(
    State(state): State<ApiState<S>>,
    Json(request): Json<RegisterUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let wallet_address = request
        .wallet_address
        .ok_or_else(|| ApiError::Validation("wallet_address is required".to_string()))?;

    let user = state
        .service
        .register_user(&wallet_address, request.referrer_id)
        .await?;
    Ok(Json(UserResponse { user }))
}

/// Get all ten level rows for a user
pub async fn get_user_levels<S: MatrixStore>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<LevelsResponse>> {
    let user_id = parse_user_id(&id)?;
    let levels = state.service.store().levels_for_user(user_id).await?;
    if levels.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no levels found for user {}",
            user_id
        )));
    }
    Ok(Json(LevelsResponse { levels }))
}

/// Get a user's matrix positions
pub async fn get_user_matrix<S: MatrixStore>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MatrixResponse>> {
    let user_id = parse_user_id(&id)?;
    let positions = state.service.store().positions_for_user(user_id).await?;
    Ok(Json(MatrixResponse { positions }))
}

/// Query parameters for transaction history
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<i64>,
}

/// Get a user's most recent ledger entries
pub async fn get_user_transactions<S: MatrixStore>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> ApiResult<Json<TransactionsResponse>> {
    let user_id = parse_user_id(&id)?;
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let transactions = state
        .service
        .store()
        .recent_transactions(user_id, limit)
        .await?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// Get a user's notifications, unread first
pub async fn get_user_notifications<S: MatrixStore>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<NotificationsResponse>> {
    let user_id = parse_user_id(&id)?;
    let notifications = state
        .service
        .store()
        .notifications_for_user(user_id)
        .await?;
    Ok(Json(NotificationsResponse { notifications }))
}

/// Get dashboard summary numbers for a user
pub async fn get_user_summary<S: MatrixStore>(
    State(state): State<ApiState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    let user_id = parse_user_id(&id)?;
    let summary = state.service.dashboard_summary(user_id).await?;
    Ok(Json(SummaryResponse::new(user_id, summary)))
}
