//! REST API for the matrix referral dashboard

mod handlers;
mod responses;
mod routes;

pub use responses::*;
pub use routes::*;

use anyhow::Result;
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::services::LevelService;
use crate::store::MatrixStore;

/// Start the API server
pub async fn start_server<S: MatrixStore + 'static>(
    service: Arc<LevelService<S>>,
    config: &ApiConfig,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = create_router(service, config.enable_cors);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("API server listening on {}", config.bind_address);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(handle)
}

/// Create the API application
pub fn create_router<S: MatrixStore + 'static>(
    service: Arc<LevelService<S>>,
    enable_cors: bool,
) -> Router {
    let api_state = ApiState::new(service);

    let mut app = Router::new()
        .merge(create_purchase_routes())
        .merge(create_user_routes())
        .route("/health", get(health_handler::<S>))
        .with_state(api_state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app = app.layer(ServiceBuilder::new().layer(CorsLayer::permissive()));
    }

    app
}

/// Health check handler: liveness plus a storage ping
async fn health_handler<S: MatrixStore>(
    State(state): State<ApiState<S>>,
) -> ApiResult<Json<Value>> {
    state.service.store().ping().await?;
    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "service": "cosmo-matrix"
    })))
}

/// Shared API state
pub struct ApiState<S> {
    pub service: Arc<LevelService<S>>,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<S: MatrixStore> ApiState<S> {
    pub fn new(service: Arc<LevelService<S>>) -> Self {
        Self { service }
    }
}
