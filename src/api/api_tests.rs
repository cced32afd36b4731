#[cfg(test)]
mod chat_api_tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::api::{app_state::AppState, create_router};
    use crate::error::AppError;
    use crate::llm::{Completion, MockLocalModelClient, MockRemoteModelClient};
    use crate::observability::AppMetrics;
    use crate::services::{ChatRouter, SearchAggregator};
    use crate::storage::InMemoryHistoryStore;

    fn app(local: MockLocalModelClient, remote: MockRemoteModelClient) -> Router {
        let metrics = Arc::new(AppMetrics::default());
        let router = ChatRouter::new(
            Arc::new(local),
            Arc::new(remote),
            Arc::new(InMemoryHistoryStore::new(64)),
            6,
            0.000_000_14,
            metrics.clone(),
        );
        let aggregator = SearchAggregator::new(Vec::new(), 20, 50, metrics.clone());
        create_router(AppState::new(router, aggregator, metrics))
    }

    fn named_local() -> MockLocalModelClient {
        let mut local = MockLocalModelClient::new();
        local.expect_model_name().return_const("phi:2.7b".to_string());
        local
    }

    fn named_remote() -> MockRemoteModelClient {
        let mut remote = MockRemoteModelClient::new();
        remote
            .expect_model_name()
            .return_const("deepseek-chat".to_string());
        remote
    }

    async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_local_reply() {
        let mut local = MockLocalModelClient::new();
        local
            .expect_generate()
            .returning(|_| Ok("Hello there".to_string()));

        let (status, body) = post(
            app(local, MockRemoteModelClient::new()),
            "/api/v1/ai/chat",
            json!({ "message": "hi", "chatId": "abc12345-xyz" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chatId"], "abc12345-xyz");
        assert_eq!(body["reply"], "Hello there");
        assert_eq!(body["model"], "local");
        assert_eq!(body["cost"], 0.0);
        assert_eq!(body["citations"], json!([]));
        assert!(body.get("tokens").is_none());
    }

    #[tokio::test]
    async fn test_chat_reports_fallback_backend() {
        let mut local = MockLocalModelClient::new();
        local
            .expect_generate()
            .returning(|_| Err(AppError::Model("ollama down".into())));
        let mut remote = MockRemoteModelClient::new();
        remote.expect_chat().returning(|_| {
            Ok(Completion {
                content: "cloud says hi (Smith, 2020)".to_string(),
                total_tokens: 100,
            })
        });

        let (status, body) = post(
            app(local, remote),
            "/api/v1/ai/chat",
            json!({ "message": "hello", "chatId": "c1", "mode": "normal" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "deepseek");
        assert_eq!(body["tokens"], 100);
        assert_eq!(body["citations"], json!(["(Smith, 2020)"]));
    }

    #[tokio::test]
    async fn test_chat_total_failure_is_500() {
        let mut local = MockLocalModelClient::new();
        local
            .expect_generate()
            .returning(|_| Err(AppError::Model("down".into())));
        let mut remote = MockRemoteModelClient::new();
        remote
            .expect_chat()
            .returning(|_| Err(AppError::Model("also down".into())));

        let (status, body) = post(
            app(local, remote),
            "/api/v1/ai/chat",
            json!({ "message": "hi", "chatId": "c1" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "AI request failed");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_chat_validation_messages() {
        let (status, body) = post(
            app(MockLocalModelClient::new(), MockRemoteModelClient::new()),
            "/api/v1/ai/chat",
            json!({ "chatId": "c1" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");

        let (status, body) = post(
            app(MockLocalModelClient::new(), MockRemoteModelClient::new()),
            "/api/v1/ai/chat",
            json!({ "message": "hi" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Chat ID is required");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let response = app(MockLocalModelClient::new(), MockRemoteModelClient::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/ai/chat")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats() {
        let (status, body) = get(app(named_local(), named_remote()), "/api/v1/ai/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");
        assert_eq!(body["models"]["local"], "phi:2.7b");
        assert_eq!(body["models"]["cloud"], "deepseek-chat");
        assert_eq!(body["sessions"], 0);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_model_probe() {
        let mut local = MockLocalModelClient::new();
        local
            .expect_generate()
            .withf(|prompt| prompt == "Hello, are you working?")
            .returning(|_| Ok("Yes".to_string()));

        let (status, body) = post(
            app(local, MockRemoteModelClient::new()),
            "/api/v1/ai/test",
            json!({ "model": "local" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success", "model": "local", "response": "Yes" }));
    }

    #[tokio::test]
    async fn test_model_probe_rejects_unknown_model() {
        let (status, body) = post(
            app(MockLocalModelClient::new(), MockRemoteModelClient::new()),
            "/api/v1/ai/test",
            json!({ "model": "gpt" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid model specified");
    }

    #[tokio::test]
    async fn test_model_probe_failure_is_500() {
        let mut remote = MockRemoteModelClient::new();
        remote
            .expect_chat()
            .returning(|_| Err(AppError::Config("DeepSeek API key not configured".into())));

        let (status, _) = post(
            app(MockLocalModelClient::new(), remote),
            "/api/v1/ai/test",
            json!({ "model": "deepseek" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let (status, body) = post(
            app(MockLocalModelClient::new(), MockRemoteModelClient::new()),
            "/api/v1/search",
            json!({ "query": "   " }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query is required");
    }

    #[tokio::test]
    async fn test_search_with_no_providers_is_empty() {
        let (status, body) = post(
            app(MockLocalModelClient::new(), MockRemoteModelClient::new()),
            "/api/v1/search",
            json!({ "query": "graphene", "page": "0", "pageSize": 500 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "query": "graphene", "total": 0, "page": 1, "pageSize": 50, "results": [] })
        );
    }

    #[tokio::test]
    async fn test_responses_carry_security_headers() {
        let response = app(named_local(), named_remote())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/search/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }
}
