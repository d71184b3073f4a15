// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Sentence embedding encoders.
//!
//! Retrieval quality depends on one invariant: the exact same encoder is
//! used for product descriptions at load time and for questions at query
//! time. Both the loader and the retriever therefore share a single
//! [`SentenceEncoder`] handle built once by [`encoder_from_config`].

pub mod onnx;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{RagError, Result};

pub use onnx::OnnxEncoder;

/// Output dimensionality of all-MiniLM-L6-v2, and therefore of the vector
/// index. The fallback encoder uses the same size so that a graph loaded
/// with one encoder stays queryable with the other during development.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Maps free text to a fixed-length vector. Deterministic for a fixed
/// model; identical for indexing and querying.
#[async_trait]
pub trait SentenceEncoder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;
}

/// Deterministic seeded pseudo-embedding.
///
/// Not semantically meaningful, but stable per input and unit-norm, which is
/// all the test suite and credential-free development need. Equal texts map
/// to equal vectors, so exact-match retrieval behaves like the real model.
pub struct HashEncoder {
    dimension: usize,
}

impl HashEncoder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEncoder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIMENSION)
    }
}

#[async_trait]
impl SentenceEncoder for HashEncoder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(RagError::Embedding("input text is empty".into()));
        }

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            // Linear congruential step keyed by position.
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407)
                ^ (i as u64);
            let value = (state as f64 / u64::MAX as f64) * 2.0 - 1.0;
            embedding.push(value as f32);
        }

        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Build the shared encoder from configuration.
///
/// With `EMBEDDING_MODEL_DIR` set, loads the ONNX all-MiniLM-L6-v2 model
/// from that directory; otherwise falls back to [`HashEncoder`].
pub async fn encoder_from_config(config: &AppConfig) -> Result<Arc<dyn SentenceEncoder>> {
    match &config.embedding_model_dir {
        Some(dir) => {
            info!(model_dir = %dir.display(), "loading ONNX sentence encoder");
            let encoder = OnnxEncoder::load(dir).await?;
            Ok(Arc::new(encoder))
        }
        None => {
            warn!("EMBEDDING_MODEL_DIR not set, using deterministic fallback encoder");
            Ok(Arc::new(HashEncoder::default()))
        }
    }
}
