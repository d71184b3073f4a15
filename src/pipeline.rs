// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Question-answer pipeline: embed, retrieve, generate.
//!
//! One linear pass per question, no session state. An empty retrieval
//! degrades gracefully: the generator is still invoked, prompted with an
//! explicit "no context" marker.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::generation::AnswerGenerator;
use crate::retrieval::ContextRetriever;

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    /// Whether retrieval found any product context for the question.
    pub context_found: bool,
}

pub struct AnswerPipeline {
    retriever: ContextRetriever,
    generator: Arc<dyn AnswerGenerator>,
}

impl AnswerPipeline {
    pub fn new(retriever: ContextRetriever, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let context = self.retriever.retrieve(question).await?;
        let context_found = !context.is_empty();
        if !context_found {
            info!("no context found for question, generating ungrounded answer");
        }

        let text = self
            .generator
            .generate(&context.as_prompt_text(), question)
            .await?;

        Ok(Answer {
            text,
            context_found,
        })
    }
}
