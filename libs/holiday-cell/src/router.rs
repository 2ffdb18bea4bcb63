use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Calendar feed consumed by the booking form; no authentication.
pub fn public_holiday_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_holidays))
        .with_state(state)
}

/// Holiday management for clinic staff.
pub fn admin_holiday_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_holiday))
        .route("/{holiday_id}", delete(handlers::delete_holiday))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
