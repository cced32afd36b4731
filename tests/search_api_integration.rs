use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use semantix::api::{app_state::AppState, create_router};
use semantix::config::AppConfig;
use semantix::observability::AppMetrics;
use semantix::services::{create_chat_router, create_search_aggregator};

struct Upstreams {
    openalex: MockServer,
    doaj: MockServer,
    core: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        Self {
            openalex: MockServer::start().await,
            doaj: MockServer::start().await,
            core: MockServer::start().await,
        }
    }

    fn app(&self) -> Router {
        let mut config = AppConfig::default();
        config.search.timeout_secs = 5;
        config.search.openalex.base_url = self.openalex.uri();
        config.search.doaj.base_url = self.doaj.uri();
        config.search.core.base_url = self.core.uri();
        config.search.core.api_key = "core-key".to_string();

        let metrics = Arc::new(AppMetrics::default());
        let chat_router = create_chat_router(&config, metrics.clone()).unwrap();
        let aggregator = create_search_aggregator(&config, metrics.clone()).unwrap();
        create_router(AppState::new(chat_router, aggregator, metrics))
    }
}

async fn post_search(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/search")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn openalex_work(title: &str, author: &str) -> Value {
    json!({
        "id": format!("https://openalex.org/{title}"),
        "title": title,
        "authorships": [{ "author": { "display_name": author } }],
        "publication_date": "2020-01-01"
    })
}

fn doaj_article(title: &str, author: &str) -> Value {
    json!({
        "id": format!("doaj-{title}"),
        "bibjson": { "title": title, "author": [{ "name": author }], "year": "2019" }
    })
}

#[tokio::test]
async fn test_duplicate_across_providers_keeps_openalex() {
    let upstreams = Upstreams::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [openalex_work("X", "A")] })),
        )
        .mount(&upstreams.openalex)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/articles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [doaj_article("X", "A")] })),
        )
        .mount(&upstreams.doaj)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&upstreams.core)
        .await;

    let (status, body) = post_search(upstreams.app(), json!({ "query": "x" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["title"], "X");
    assert_eq!(body["results"][0]["source"], "OpenAlex");
}

#[tokio::test]
async fn test_core_failure_is_isolated() {
    let upstreams = Upstreams::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [openalex_work("A", "One")] })),
        )
        .mount(&upstreams.openalex)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/articles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [doaj_article("B", "Two")] })),
        )
        .mount(&upstreams.doaj)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/works"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstreams.core)
        .await;

    let (status, body) = post_search(upstreams.app(), json!({ "query": "anything" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert!(body.get("error").is_none());
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 20);
}

#[tokio::test]
async fn test_scope_limits_fan_out() {
    let upstreams = Upstreams::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&upstreams.openalex)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/articles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [doaj_article("D", "Z")] })),
        )
        .expect(1)
        .mount(&upstreams.doaj)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&upstreams.core)
        .await;

    let (status, body) = post_search(
        upstreams.app(),
        json!({ "query": "d", "scope": "doaj", "filters": { "duration": "all" } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["source"], "DOAJ");
}

#[tokio::test]
async fn test_missing_query_is_rejected() {
    let upstreams = Upstreams::start().await;
    let (status, body) = post_search(upstreams.app(), json!({ "scope": "all" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query is required");
}

#[tokio::test]
async fn test_search_health_reports_providers() {
    let upstreams = Upstreams::start().await;
    let response = upstreams
        .app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/search/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({ "status": "ok", "providers": { "openalex": true, "doaj": true, "core": true } })
    );
}
