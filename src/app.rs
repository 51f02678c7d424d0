use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/views", get(handlers::get_views))
        .route("/api/cards", post(handlers::post_cards))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/breakdown", get(handlers::get_breakdown))
        .with_state(state)
}
