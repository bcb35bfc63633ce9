use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/day/save", post(handlers::save_day_form))
        .route("/api/day/:date", get(handlers::get_day))
        .route("/api/day", post(handlers::save_day))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/calendar/:year/:month", get(handlers::get_calendar))
        .route("/api/reload", post(handlers::reload))
        .with_state(state)
}
