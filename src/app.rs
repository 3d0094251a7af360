use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/count/increment", post(handlers::increment_form))
        .route("/count/reset", post(handlers::reset_form))
        .route("/api/count", get(handlers::get_count))
        .route("/api/increment", post(handlers::increment))
        .route("/api/reset", post(handlers::reset))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/history", get(handlers::get_history))
        .route(
            "/api/notifications",
            get(handlers::get_notifications).put(handlers::put_notification),
        )
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::put_setting),
        )
        .with_state(state)
}
