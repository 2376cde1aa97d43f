// GET /api/model: class order and artifact metadata.
//
// Clients call this once to learn which probability index maps to which
// label before rendering anything.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::{classifier_error, AppState};

pub async fn get_model(State(state): State<AppState>) -> Response {
    let model = match state.service.model() {
        Ok(model) => model,
        Err(e) => return classifier_error(&e),
    };

    Json(serde_json::json!({
        "classes": model.classes(),
        "vocabulary": model.vectorizer().vocabulary_size(),
        "stemming": model.vectorizer().analyzer().stems(),
        "trained_at": state.service.trained_at(),
    }))
    .into_response()
}
