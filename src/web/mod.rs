// Web server: Axum JSON inference boundary.
//
// Presentation (gauges, banners, charts) belongs to whatever client calls
// this. The server only hands out probabilities in the model's class order
// plus the verdict, so clients never guess which index means what.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::classifier::ClassificationService;
use crate::error::ClassifierError;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
///
/// The service is constructed and made Ready by the caller before the server
/// starts; handlers only ever read from it.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassificationService>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(service: Arc<ClassificationService>, bind: &str, port: u16) -> Result<()> {
    let app = build_router(AppState { service });

    let addr = listen_addr(bind, port);
    info!("TruthLens API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// `host:port` for the listener. Hostnames resolve at bind time; a bare
/// IPv6 literal gets the brackets it needs.
pub fn listen_addr(bind: &str, port: u16) -> String {
    if bind.contains(':') && !bind.starts_with('[') {
        format!("[{bind}]:{port}")
    } else {
        format!("{bind}:{port}")
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/model", get(handlers::model::get_model))
        .route("/api/classify", post(handlers::classify::classify))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check: always returns 200 OK, even before a model is loaded.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

/// Map a classifier error onto an HTTP response.
pub fn classifier_error(err: &ClassifierError) -> Response {
    let status = match err {
        ClassifierError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
        ClassifierError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, &err.to_string())
}
