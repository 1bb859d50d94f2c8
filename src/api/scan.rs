use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use super::lookup::NOT_FOUND_MESSAGE;
use super::{busy_response, error_response};
use crate::infrastructure::AppState;
use crate::services::ScannedBook;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub isbn: String,
}

// Look up and save in one step
pub async fn scan_book(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> impl IntoResponse {
    let Some(_lookup) = state.guards.lookup.try_begin() else {
        return busy_response("lookup");
    };
    let Some(_save) = state.guards.mutation.try_begin() else {
        return busy_response("save");
    };

    match state.books.scan_and_add(&req.isbn).await {
        Ok(Some(book)) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Book added to your library",
                "book": book
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": NOT_FOUND_MESSAGE })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// Save a preview previously returned by the lookup endpoint
pub async fn confirm_scan(
    State(state): State<AppState>,
    Json(scanned): Json<ScannedBook>,
) -> impl IntoResponse {
    let Some(_ticket) = state.guards.mutation.try_begin() else {
        return busy_response("save");
    };

    match state.books.add_scanned(scanned).await {
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
