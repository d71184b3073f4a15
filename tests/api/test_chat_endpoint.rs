// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Router-level tests for the chat interface, driven through `oneshot`
//! with an in-memory pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chainsight::api::{router, AppState};
use chainsight::{
    AnswerGenerator, AnswerPipeline, ContextRetriever, GraphStore, HashEncoder, MemoryStore,
    Product, SentenceEncoder,
};
use tower::ServiceExt;

struct StubGenerator;

#[async_trait]
impl AnswerGenerator for StubGenerator {
    async fn generate(&self, _context: &str, question: &str) -> chainsight::Result<String> {
        Ok(format!("stub answer for: {}", question))
    }
}

async fn test_state() -> AppState {
    let encoder: Arc<dyn SentenceEncoder> = Arc::new(HashEncoder::default());
    let store = Arc::new(MemoryStore::new());

    let laptop = Product {
        id: "P001".into(),
        name: "Laptop".into(),
        description: "High performance laptop".into(),
        price: 1299.99,
        category: "Electronics".into(),
    };
    let embedding = encoder.embed(&laptop.description).await.unwrap();
    store.upsert_product(&laptop, &embedding).await.unwrap();

    let pipeline = Arc::new(AnswerPipeline::new(
        ContextRetriever::new(encoder, store),
        Arc::new(StubGenerator),
    ));
    AppState::new(pipeline)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_chat_returns_answer() {
    let app = router(test_state().await);

    let response = app
        .oneshot(chat_request(r#"{"question": "Where are laptops stored?"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["answer"].as_str().unwrap().starts_with("stub answer"));
    assert_eq!(body["context_found"], true);
}

#[tokio::test]
async fn test_empty_question_rejected() {
    let app = router(test_state().await);

    let response = app
        .oneshot(chat_request(r#"{"question": "   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error_code"], "EMPTY_QUESTION");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = router(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_index_serves_chat_page() {
    let app = router(test_state().await);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Supply Chain Assistant"));
}
