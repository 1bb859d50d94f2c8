use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::domain::BookFilter;
use crate::infrastructure::AppState;
use crate::services::stats_service::{self, ChallengeKind};

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub target: i64,
}

pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let books = match state.books.refresh(BookFilter::default()).await {
        Ok(books) => books,
        Err(e) => return error_response(e),
    };

    let targets = *state.targets.read().await;
    Json(json!(stats_service::report(&books, targets, chrono::Utc::now()))).into_response()
}

pub async fn set_challenge_target(
    State(state): State<AppState>,
    Path(kind): Path<ChallengeKind>,
    Json(req): Json<TargetRequest>,
) -> impl IntoResponse {
    let mut targets = state.targets.write().await;
    if let Err(e) = targets.set_target(kind, req.target) {
        return error_response(e);
    }
    Json(json!({ "targets": *targets })).into_response()
}
