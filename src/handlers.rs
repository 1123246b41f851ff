use crate::book::Book;
use crate::errors::AppError;
use crate::models::{
    BookView, ChartsResponse, ListingParams, ListingResponse, SeriesShelf, SummaryResponse,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Html<String> {
    let dashboard = &state.dashboard;
    let summary = dashboard.summary();
    let featured = dashboard.random_read_book(&mut rand::thread_rng());
    Html(render_index(dashboard, &params, &summary, featured))
}

pub async fn get_books(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Json<ListingResponse> {
    let listing = state.dashboard.listing(&params);
    Json(ListingResponse {
        page: listing.page(),
        page_size: listing.page_size(),
        revealed: listing.revealed(),
        total: listing.total(),
        has_more: listing.has_more(),
        books: listing.visible().iter().map(Book::to_view).collect(),
    })
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<BookView>, AppError> {
    state
        .dashboard
        .find_book(&book_id)
        .map(|book| Json(book.to_view()))
        .ok_or_else(|| AppError::not_found(format!("no book with id {book_id}")))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    Json(state.dashboard.summary())
}

pub async fn get_charts(State(state): State<AppState>) -> Json<ChartsResponse> {
    Json(state.dashboard.charts())
}

pub async fn get_series(State(state): State<AppState>) -> Json<Vec<SeriesShelf>> {
    Json(state.dashboard.series_shelves())
}

pub async fn get_random(State(state): State<AppState>) -> Result<Json<BookView>, AppError> {
    state
        .dashboard
        .random_read_book(&mut rand::thread_rng())
        .map(|book| Json(book.to_view()))
        .ok_or_else(|| AppError::not_found("no read books"))
}
