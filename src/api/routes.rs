//! API route definitions

use axum::{
    routing::{get, post},
    Router,
};

use super::{handlers::*, ApiState};
use crate::store::MatrixStore;

/// Create purchase routes (the checker and the confirmer)
pub fn create_purchase_routes<S: MatrixStore + 'static>() -> Router<ApiState<S>> {
    Router::new()
        .route("/check-levels", post(check_levels::<S>))
        .route("/confirm-purchase", post(confirm_purchase::<S>))
}

/// Create user and dashboard routes
pub fn create_user_routes<S: MatrixStore + 'static>() -> Router<ApiState<S>> {
    Router::new()
        .route("/users", post(register_user::<S>))
        .route("/users/:id/levels", get(get_user_levels::<S>))
        .route("/users/:id/matrix", get(get_user_matrix::<S>))
        .route("/users/:id/transactions", get(get_user_transactions::<S>))
        .route("/users/:id/notifications", get(get_user_notifications::<S>))
        .route("/users/:id/summary", get(get_user_summary::<S>))
}
