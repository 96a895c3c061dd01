//! HTTP routes for the storefront service

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::state::AppState;

pub mod auth;
pub mod currency;
pub mod password_reset;
pub mod products;

/// Create the router for the storefront service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth::router().merge(password_reset::router()))
        .nest("/api/products", products::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = match state.users.ping().await {
        Ok(healthy) => healthy,
        Err(e) => {
            error!("Health check failed: {}", e);
            false
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "unavailable" },
            "service": "storefront",
            "database": database,
        })),
    )
}
