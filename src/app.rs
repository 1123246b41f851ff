use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/books", get(handlers::get_books))
        .route("/api/books/:id", get(handlers::get_book))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/charts", get(handlers::get_charts))
        .route("/api/series", get(handlers::get_series))
        .route("/api/random", get(handlers::get_random))
        .with_state(state)
}
