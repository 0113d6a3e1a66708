pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommendation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/assessment", post(handlers::handle_create_assessment))
        .route(
            "/api/assessment/:session_id",
            get(handlers::handle_get_assessment),
        )
        .with_state(state)
}
