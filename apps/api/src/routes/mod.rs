pub mod health;

use axum::{routing::get, Router};

use crate::recommendation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/soil/defaults", get(handlers::handle_get_defaults))
        .route(
            "/api/v1/recommendations",
            get(handlers::handle_get_session)
                .post(handlers::handle_submit)
                .delete(handlers::handle_reset),
        )
        .with_state(state)
}
