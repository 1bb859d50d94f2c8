//! Book API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::{busy_response, error_response};
use crate::domain::BookFilter;
use crate::infrastructure::AppState;
use crate::models::ReadingStatus;
use crate::services::{DetailsUpdate, LibraryCounts, ManualEntry, StatusUpdate, filter_books};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<ReadingStatus>,
    pub q: Option<String>,
}

// List the library, optionally narrowed by status and a search query.
// Counts always cover the whole library.
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match state.books.refresh(BookFilter::default()).await {
        Ok(all) => {
            let counts = LibraryCounts::from_books(&all);
            let books = filter_books(&all, query.status.into(), query.q.as_deref().unwrap_or(""));
            Json(json!({
                "books": books,
                "total": books.len(),
                "counts": counts
            }))
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

// Manual entry
pub async fn create_book(
    State(state): State<AppState>,
    Json(entry): Json<ManualEntry>,
) -> impl IntoResponse {
    let Some(_ticket) = state.guards.mutation.try_begin() else {
        return busy_response("save");
    };

    match state.books.add_manual(entry).await {
        Ok(book) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Book added to your library",
                "book": book
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Status, rating, review and borrower changes
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> impl IntoResponse {
    let Some(_ticket) = state.guards.mutation.try_begin() else {
        return busy_response("save");
    };

    match state.books.update_progress(&id, update).await {
        Ok(change) => {
            state.wheel.mark_status(&id, change.book.status);
            Json(json!(change)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DetailsUpdate>,
) -> impl IntoResponse {
    let Some(_ticket) = state.guards.mutation.try_begin() else {
        return busy_response("save");
    };

    match state.books.update_details(&id, update).await {
        Ok(book) => Json(json!({ "book": book })).into_response(),
        Err(e) => error_response(e),
    }
}

// Delete is permanent; an unknown id is a 404
pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let Some(_ticket) = state.guards.mutation.try_begin() else {
        return busy_response("save");
    };

    match state.books.delete_book(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"message": "Book deleted successfully"})),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
