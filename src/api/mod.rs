pub mod books;
pub mod genres;
pub mod health;
pub mod lookup;
pub mod scan;
pub mod stats;
pub mod wheel;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            put(books::update_book).delete(books::delete_book),
        )
        .route("/books/:id/status", put(books::update_status))
        // Scanning
        .route("/lookup/:isbn", get(lookup::lookup_book))
        .route("/scan", post(scan::scan_book))
        .route("/scan/confirm", post(scan::confirm_scan))
        // Genres
        .route("/genres", get(genres::list_genres))
        // Wheel
        .route("/wheel", get(wheel::get_wheel))
        .route("/wheel/spin", post(wheel::spin))
        .route("/wheel/genres/toggle", post(wheel::toggle_genre))
        .route("/wheel/mode", put(wheel::set_mode))
        // Stats
        .route("/stats", get(stats::get_stats))
        .route("/stats/challenges/:kind", put(stats::set_challenge_target))
        .with_state(state)
}

/// Map a business error to its HTTP status and `{"error": ...}` body
pub fn error_response(err: DomainError) -> Response {
    let (status, message) = match &err {
        DomainError::NotFound => (StatusCode::NOT_FOUND, "Book not found".to_string()),
        DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        DomainError::Duplicate(_) => (StatusCode::CONFLICT, err.to_string()),
        DomainError::External(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
        DomainError::Database(_) | DomainError::Internal(_) => {
            tracing::error!("Request failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    };

    (status, Json(json!({ "error": message }))).into_response()
}

/// A second trigger while the same kind of request is still pending
pub fn busy_response(operation: &str) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": format!("A {} is already in progress", operation) })),
    )
        .into_response()
}
