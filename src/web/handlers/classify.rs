// POST /api/classify: classify one document.
//
// Body: {"text": "<document>"}. A missing, null or non-string `text` is a
// client error (422), not a crash. A body that is not JSON at all gets the
// same `{"error": ...}` shape with axum's rejection status. Scoring is
// CPU-bound, so it runs on the blocking pool.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::error;

use crate::error::ClassifierError;
use crate::web::{api_error, classifier_error, AppState};

pub async fn classify(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return api_error(rejection.status(), &rejection.body_text()),
    };

    let text = match body.get("text") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => {
            return classifier_error(&ClassifierError::InvalidInput(
                "request body needs a string field `text`".to_string(),
            ))
        }
        Some(_) => {
            return classifier_error(&ClassifierError::InvalidInput(
                "`text` must be a string".to_string(),
            ))
        }
    };

    let service = state.service.clone();
    match tokio::task::spawn_blocking(move || service.predict(&text)).await {
        Ok(Ok(prediction)) => (StatusCode::OK, Json(prediction)).into_response(),
        Ok(Err(e)) => classifier_error(&e),
        Err(e) => {
            error!(error = %e, "Classification task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "classification task failed")
        }
    }
}
