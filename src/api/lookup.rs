use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::{busy_response, error_response};
use crate::infrastructure::AppState;

pub const NOT_FOUND_MESSAGE: &str =
    "Could not find book information. Try entering details manually.";

/// Duplicate check and metadata preview for an ISBN; nothing is saved
pub async fn lookup_book(State(state): State<AppState>, Path(isbn): Path<String>) -> impl IntoResponse {
    let Some(_ticket) = state.guards.lookup.try_begin() else {
        return busy_response("lookup");
    };

    match state.books.lookup_isbn(&isbn).await {
        Ok(Some(scanned)) => (StatusCode::OK, Json(json!(scanned))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": NOT_FOUND_MESSAGE })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
