// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! `GeminiGenerator` driven over real HTTP against a local axum listener
//! standing in for the Gemini endpoint: success extraction, non-2xx status
//! mapping, and empty-candidate handling.

use axum::http::StatusCode;
use axum::{Json, Router};
use chainsight::{AnswerGenerator, GeminiGenerator, RagError};
use serde_json::{json, Value};

/// Bind a throwaway port and serve the router for the lifetime of the test.
/// The generator's model-qualified path varies, so everything lands on the
/// fallback handler.
async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn generator_against(base_url: String) -> GeminiGenerator {
    GeminiGenerator::new("test-key", "gemini-1.5-flash")
        .unwrap()
        .with_base_url(base_url)
}

#[tokio::test]
async fn test_generate_extracts_and_trims_candidate_text() {
    let router = Router::new().fallback(|Json(request): Json<Value>| async move {
        // The prompt must carry what the pipeline passed in.
        let prompt = request["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default();
        assert!(prompt.contains("Context: Product: Laptop"));
        assert!(prompt.contains("Question: Where are laptops stored?"));
        Json(json!({
            "candidates": [
                {"content": {"parts": [{"text": "  Laptops are stored at Central.  "}]}}
            ]
        }))
    });
    let base_url = spawn_stub(router).await;

    let answer = generator_against(base_url)
        .generate("Product: Laptop", "Where are laptops stored?")
        .await
        .unwrap();
    assert_eq!(answer, "Laptops are stored at Central.");
}

#[tokio::test]
async fn test_non_success_status_maps_to_generation_error() {
    let router = Router::new()
        .fallback(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exhausted") });
    let base_url = spawn_stub(router).await;

    let err = generator_against(base_url)
        .generate("some context", "some question")
        .await
        .unwrap_err();
    match err {
        RagError::Generation { status, message } => {
            assert_eq!(status, 429);
            assert!(message.contains("quota exhausted"));
        }
        other => panic!("expected Generation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_response_without_candidates_is_generation_error() {
    let router = Router::new().fallback(|| async { Json(json!({})) });
    let base_url = spawn_stub(router).await;

    let err = generator_against(base_url)
        .generate("some context", "some question")
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "GENERATION");
    assert!(err.to_string().contains("no candidates"));
}
