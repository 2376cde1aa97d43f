// HTTP boundary tests: requests go through the real router via `oneshot`,
// no sockets involved.

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use truthlens::classifier::{ClassificationService, TrainingParams};
use truthlens::corpus::Corpus;
use truthlens::web::{build_router, listen_addr, AppState};

fn ready_router() -> Router {
    let service = ClassificationService::new().with_max_input_chars(200);
    service
        .fit(
            &Corpus::from_pairs([
                ("Bank of Italy warns of fraud", "FAKE"),
                ("NASA confirms water on Mars", "REAL"),
                ("Aliens run the government", "FAKE"),
                ("Vaccines are safe per health ministry", "REAL"),
            ]),
            &TrainingParams::default(),
        )
        .unwrap();
    build_router(AppState {
        service: Arc::new(service),
    })
}

fn untrained_router() -> Router {
    build_router(AppState {
        service: Arc::new(ClassificationService::new()),
    })
}

async fn post_classify(router: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/classify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_is_ok_even_untrained() {
    let (status, body) = send(untrained_router(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn classify_returns_probabilities_in_class_order() {
    let (status, body) =
        post_classify(ready_router(), r#"{"text":"Officials confirm new vaccine safety data"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classes"], serde_json::json!(["FAKE", "REAL"]));

    let p = body["probabilities"].as_array().unwrap();
    let (p0, p1) = (p[0].as_f64().unwrap(), p[1].as_f64().unwrap());
    assert!((p0 + p1 - 1.0).abs() < 1e-9);
    assert!(p1 > p0);
    assert_eq!(body["verdict"]["label"], "REAL");
}

#[tokio::test]
async fn empty_text_is_valid() {
    let (status, body) = post_classify(ready_router(), r#"{"text":""}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["verdict"]["label"].is_string());
}

#[tokio::test]
async fn null_or_missing_text_is_unprocessable() {
    for payload in [r#"{"text":null}"#, r#"{}"#, r#"{"text":42}"#] {
        let (status, body) = post_classify(ready_router(), payload).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn malformed_json_gets_json_error() {
    let (status, body) = post_classify(ready_router(), r#"{"text": "unterminated"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_content_type_gets_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/classify")
        .body(Body::from(r#"{"text":"hello"}"#))
        .unwrap();
    let (status, body) = send(ready_router(), request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn oversized_text_is_unprocessable() {
    let payload = serde_json::json!({ "text": "word ".repeat(100) }).to_string();
    let (status, _) = post_classify(ready_router(), &payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn untrained_service_is_unavailable() {
    let (status, _) = post_classify(untrained_router(), r#"{"text":"hello"}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(untrained_router(), get("/api/model")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn model_endpoint_describes_classes() {
    let (status, body) = send(ready_router(), get("/api/model")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classes"], serde_json::json!(["FAKE", "REAL"]));
    assert!(body["vocabulary"].as_u64().unwrap() > 0);
    assert_eq!(body["stemming"], true);
    assert!(body["trained_at"].is_string());
}

#[test]
fn listen_addr_keeps_hostnames_and_brackets_ipv6() {
    assert_eq!(listen_addr("localhost", 8080), "localhost:8080");
    assert_eq!(listen_addr("0.0.0.0", 80), "0.0.0.0:80");
    assert_eq!(listen_addr("::1", 8080), "[::1]:8080");
    assert_eq!(listen_addr("[::1]", 8080), "[::1]:8080");
}

#[tokio::test]
async fn hostname_bind_address_resolves() {
    let listener = tokio::net::TcpListener::bind(listen_addr("localhost", 0))
        .await
        .unwrap();
    assert!(listener.local_addr().unwrap().ip().is_loopback());
}
