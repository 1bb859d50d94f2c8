use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use super::error_response;
use crate::infrastructure::AppState;

pub async fn list_genres(State(state): State<AppState>) -> impl IntoResponse {
    match state.genre_repo.find_all().await {
        Ok(genres) => Json(json!({
            "genres": genres,
            "total": genres.len()
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}
