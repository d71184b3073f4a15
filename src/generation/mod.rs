// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Answer generation via the Google Gemini REST API.
//!
//! The generator receives the question and the serialized context bundle
//! and delegates all reasoning to the external service. Failures are
//! surfaced as [`RagError::Generation`] for that one question; there is no
//! automatic retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam for the generative backend; the HTTP implementation is
/// [`GeminiGenerator`], tests substitute stubs.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Produce an answer for a question given serialized context.
    async fn generate(&self, context: &str, question: &str) -> Result<String>;
}

/// Gemini `generateContent` client.
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RagError::Generation {
                status: 0,
                message: format!("http client: {}", e),
            })?;

        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the client at a different endpoint (tests use a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    /// Minimal round-trip proving the API key and endpoint work.
    pub async fn ping(&self) -> Result<()> {
        let answer = self.generate("", "Reply with one word.").await.map_err(
            |e| match e {
                RagError::Generation { status, message } => {
                    RagError::unreachable("Gemini API", format!("status {}: {}", status, message))
                }
                other => other,
            },
        )?;
        if answer.is_empty() {
            return Err(RagError::unreachable("Gemini API", "empty response"));
        }
        Ok(())
    }
}

/// Prompt template shared by generation and the connectivity probe.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following context to answer the question.\n\n\
         Context: {}\nQuestion: {}\nAnswer:",
        context, question
    )
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    async fn generate(&self, context: &str, question: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(context, question),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Generation {
                status: 0,
                message: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RagError::Generation {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse =
            response.json().await.map_err(|e| RagError::Generation {
                status: status.as_u16(),
                message: format!("malformed response: {}", e),
            })?;

        body.first_text()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| RagError::Generation {
                status: status.as_u16(),
                message: "response contained no candidates".to_string(),
            })
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .parts
            .first()
            .map(|part| part.text.as_str())
    }
}
