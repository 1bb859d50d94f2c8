//! Wheel API handlers

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{busy_response, error_response};
use crate::domain::BookFilter;
use crate::infrastructure::AppState;
use crate::models::ReadingStatus;
use crate::services::{FilterMode, FilterUpdate, GenreFilter, SpinOutcome};

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub genre: String,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: FilterMode,
}

fn filter_json(filter: &GenreFilter) -> Value {
    json!({
        "mode": filter.mode(),
        "genres": filter.genres(),
        "description": filter.describe()
    })
}

pub async fn get_wheel(State(state): State<AppState>) -> impl IntoResponse {
    let filter = state.wheel.filter().await;
    Json(json!({
        "state": state.wheel.state(),
        "filter": filter_json(&filter)
    }))
}

pub async fn toggle_genre(
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> impl IntoResponse {
    let filter = state.wheel.toggle_genre(req.genre.trim()).await;
    Json(json!({ "filter": filter_json(&filter) }))
}

pub async fn set_mode(
    State(state): State<AppState>,
    Json(req): Json<ModeRequest>,
) -> impl IntoResponse {
    let filter = state.wheel.set_mode(req.mode).await;
    Json(json!({ "filter": filter_json(&filter) }))
}

/// Spin over the current unread collection. A body updates the session
/// filter, but only once this spin owns the wheel.
pub async fn spin(
    State(state): State<AppState>,
    body: Option<Json<FilterUpdate>>,
) -> impl IntoResponse {
    let unread = match state
        .book_repo
        .find_all(BookFilter::status(ReadingStatus::Unread))
        .await
    {
        Ok(books) => books,
        Err(e) => return error_response(e),
    };

    let update = body.map(|Json(update)| update);
    let outcome = match state
        .wheel
        .spin(
            state.book_repo.as_ref(),
            &unread,
            update,
            state.feedback.as_ref(),
        )
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return error_response(e),
    };

    let Some(filter) = outcome.filter().cloned() else {
        return busy_response("spin");
    };
    let message = match &outcome {
        SpinOutcome::NoBooks { .. } => {
            Some("Add some unread books to your library first!".to_string())
        }
        SpinOutcome::NoMatch { filter } => Some(format!(
            "No books found {} the selected genres. Try different filters!",
            match filter.mode() {
                FilterMode::Include => "with",
                FilterMode::Exclude => "without",
            }
        )),
        SpinOutcome::Picked { .. } | SpinOutcome::Busy => None,
    };

    let mut body = json!(outcome);
    if let Value::Object(fields) = &mut body {
        fields.insert("filter".to_string(), filter_json(&filter));
        if let Some(message) = message {
            fields.insert("message".to_string(), json!(message));
        }
    }
    Json(body).into_response()
}
