// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Error types shared across the assistant.
//!
//! The taxonomy follows the failure modes of the pipeline:
//! - configuration errors (missing/invalid environment),
//! - connectivity errors (graph store or generative API unreachable),
//! - import errors (malformed dataset records, reported per record),
//! - embedding errors (empty input, model inference failure),
//! - generation errors (external API failure, never retried here).
//!
//! An empty retrieval result is deliberately NOT part of this enum: a graph
//! with no matching context is a valid state and flows through the pipeline
//! as an empty context bundle.

use thiserror::Error;

/// Errors produced by the supply-chain assistant.
#[derive(Error, Debug)]
pub enum RagError {
    /// Required configuration is missing or unusable.
    #[error("configuration error: {variable}: {reason}")]
    Configuration { variable: String, reason: String },

    /// An external service could not be reached.
    #[error("{service} unreachable: {message}")]
    Connectivity { service: String, message: String },

    /// A dataset record failed validation and was skipped.
    #[error("invalid {entity} record {key}: {reason}")]
    Import {
        entity: &'static str,
        key: String,
        reason: String,
    },

    /// Embedding could not be computed.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The generative API rejected or failed the request.
    #[error("generation failed (status {status}): {message}")]
    Generation { status: u16, message: String },

    /// Driver-level graph database error.
    #[error("graph error: {0}")]
    Graph(#[from] neo4rs::Error),

    /// A query result row did not have the expected shape.
    #[error("unexpected query result: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Construct a configuration error for a named environment variable.
    pub fn config(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        RagError::Configuration {
            variable: variable.into(),
            reason: reason.into(),
        }
    }

    /// Construct a connectivity error for a named external service.
    pub fn unreachable(service: impl Into<String>, message: impl Into<String>) -> Self {
        RagError::Connectivity {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Stable code for logs and API payloads.
    pub fn error_code(&self) -> &'static str {
        match self {
            RagError::Configuration { .. } => "CONFIGURATION",
            RagError::Connectivity { .. } => "CONNECTIVITY",
            RagError::Import { .. } => "IMPORT",
            RagError::Embedding(_) => "EMBEDDING",
            RagError::Generation { .. } => "GENERATION",
            RagError::Graph(_) => "GRAPH",
            RagError::Decode(_) => "DECODE",
            RagError::Io(_) => "IO",
        }
    }

    /// Message safe to show to an end user in the chat interface.
    pub fn user_message(&self) -> String {
        match self {
            RagError::Configuration { variable, .. } => {
                format!("Service is misconfigured ({} is not set correctly)", variable)
            }
            RagError::Connectivity { service, .. } => {
                format!("Could not reach {}", service)
            }
            RagError::Generation { .. } => {
                "The answer service failed for this question. Please try again.".to_string()
            }
            RagError::Embedding(_) => "Could not process the question text.".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
