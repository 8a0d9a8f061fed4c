use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data", get(handlers::get_data))
        .route("/api/loyalty", get(handlers::get_loyalty))
        .route("/api/loyalty/summary", get(handlers::get_loyalty_summary))
        .route("/api/rewards", get(handlers::get_rewards))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
