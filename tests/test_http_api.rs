//! HTTP API routes driven through the router with `tower::ServiceExt::oneshot`.

use std::io::Write;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use gaou_bot::config::{self, Config};
use gaou_bot::extract::LlmAdapter;
use gaou_bot::llm::providers::ProviderRegistry;
use gaou_bot::llm::providers::dummy::DummyProvider;
use gaou_bot::llm::{LlmProvider, ModelId, Role};
use gaou_bot::subsystems::http::{ApiState, build_router};

fn test_config() -> Config {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[service]\nname = \"gaou-api-test\"\n").unwrap();
    config::load_from(file.path(), &|key: &str| key.ends_with("_API_KEY").then(|| "test-key".to_string())).unwrap()
}

fn app(dummy: &DummyProvider, debug: bool) -> Router {
    let config = test_config();
    let dummy = dummy.clone();
    let mut registry = ProviderRegistry::new();
    registry.register(config.http.model, move |_, _| Ok(LlmProvider::Dummy(dummy.clone())));
    let adapter = Arc::new(LlmAdapter::new(registry, config.llm.clone()));
    let mut state = ApiState::new(adapter, &config.http);
    state.debug = debug;
    build_router(state)
}

async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn call_json(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let (status, body) = call(app, method, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

const LAMBERT: &str = r#"{"name":"Lambert","age":15,"is_teenager":true,"is_intelligent":true}"#;

#[tokio::test]
async fn root_says_hello() {
    let (status, body) = call_json(app(&DummyProvider::replying("{}"), false), "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Hello": "World" }));
}

#[tokio::test]
async fn create_gaou_returns_the_descriptor() {
    let dummy = DummyProvider::replying(LAMBERT);
    let (status, body) = call_json(
        app(&dummy, false),
        "POST",
        "/gaou/Je%20suis%20Lambert%2C%2015%20ans%2C%20intelligent",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "name": "Lambert", "age": 15, "is_teenager": true, "is_intelligent": true })
    );

    let seen = dummy.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].messages[0].role, Role::System);
    assert_eq!(seen[0].messages[1].content, "Je suis Lambert, 15 ans, intelligent");
}

#[tokio::test]
async fn extraction_failure_is_a_generic_500() {
    let dummy = DummyProvider::replying(r#"{"name":"Lambert"}"#);
    let (status, body) = call_json(app(&dummy, false), "POST", "/gaou/Lambert").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "status_code": 500, "detail": "Internal Server Error" }));
}

#[tokio::test]
async fn debug_mode_exposes_the_error_text() {
    let dummy = DummyProvider::failing("upstream unreachable");
    let (status, body) = call_json(app(&dummy, true), "POST", "/gaou/Lambert").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status_code"], 500);
    assert!(body["detail"].as_str().unwrap().contains("upstream unreachable"));
}

#[tokio::test]
async fn unregistered_model_is_a_500() {
    let config = test_config();
    let adapter = Arc::new(LlmAdapter::new(ProviderRegistry::new(), config.llm.clone()));
    let router = build_router(ApiState::new(adapter, &config.http));
    let (status, _) = call(router, "POST", "/gaou/Lambert").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn wrong_method_is_rejected() {
    let (status, _) = call(app(&DummyProvider::replying(LAMBERT), false), "GET", "/gaou/Lambert").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn docs_page_and_document() {
    let (status, page) = call(app(&DummyProvider::replying("{}"), false), "GET", "/docs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(page).unwrap().contains("rapi-doc"));

    let (status, doc) = call_json(app(&DummyProvider::replying("{}"), false), "GET", "/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Gaou API");
    assert_eq!(doc["info"]["version"], "0.1.0");
    assert_eq!(
        doc["components"]["schemas"]["PersonDescriptor"]["required"],
        json!(["name", "age", "is_teenager", "is_intelligent"])
    );
}

#[test]
fn default_model_is_llama() {
    assert_eq!(test_config().http.model, ModelId::Llama3_70b);
}
