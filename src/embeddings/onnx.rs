// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! ONNX Runtime wrapper for the all-MiniLM-L6-v2 sentence transformer.
//!
//! Loads `model.onnx` and `tokenizer.json` from a model directory and
//! produces 384-dimensional sentence embeddings:
//! BERT tokenization, ONNX inference, attention-masked mean pooling over
//! token embeddings, then L2 normalization. CPU execution provider only;
//! this service has no GPU requirement.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ndarray::{Array2, Axis};
use ort::ep::CPU as CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tokenizers::Tokenizer;
use tracing::info;

use super::{SentenceEncoder, EMBEDDING_DIMENSION};
use crate::error::{RagError, Result};

const MODEL_FILE: &str = "model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// all-MiniLM-L6-v2 behind ONNX Runtime.
///
/// The session is wrapped in `Arc<Mutex>` so one loaded model can be shared
/// across the loader, the retriever, and concurrent chat sessions.
#[derive(Clone)]
pub struct OnnxEncoder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_dir: PathBuf,
}

impl std::fmt::Debug for OnnxEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEncoder")
            .field("model_dir", &self.model_dir)
            .field("dimension", &EMBEDDING_DIMENSION)
            .finish_non_exhaustive()
    }
}

impl OnnxEncoder {
    /// Load the encoder from a directory containing `model.onnx` and
    /// `tokenizer.json`.
    pub async fn load(model_dir: impl AsRef<Path>) -> Result<Self> {
        let model_dir = model_dir.as_ref().to_path_buf();
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            return Err(RagError::Embedding(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(RagError::Embedding(format!(
                "tokenizer file not found: {}",
                tokenizer_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| RagError::Embedding(format!("session builder: {}", e)))?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| RagError::Embedding(format!("execution provider: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| RagError::Embedding(format!("optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| RagError::Embedding(format!("thread config: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                RagError::Embedding(format!("loading {}: {}", model_path.display(), e))
            })?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| RagError::Embedding(format!("loading tokenizer: {}", e)))?;

        info!(model_dir = %model_dir.display(), "ONNX sentence encoder ready");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_dir,
        })
    }

    fn run_inference(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| RagError::Embedding(format!("tokenization: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids = vec![0i64; input_ids.len()];
        let mask_for_pooling = attention_mask.clone();
        let seq_len = input_ids.len();

        let to_array = |data: Vec<i64>| {
            Array2::from_shape_vec((1, seq_len), data)
                .map_err(|e| RagError::Embedding(format!("input tensor: {}", e)))
        };
        let input_ids = to_array(input_ids)?;
        let attention_mask = to_array(attention_mask)?;
        let token_type_ids = to_array(token_type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| RagError::Embedding("encoder session poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => Value::from_array(input_ids)
                    .map_err(|e| RagError::Embedding(e.to_string()))?,
                "attention_mask" => Value::from_array(attention_mask)
                    .map_err(|e| RagError::Embedding(e.to_string()))?,
                "token_type_ids" => Value::from_array(token_type_ids)
                    .map_err(|e| RagError::Embedding(e.to_string()))?
            ])
            .map_err(|e| RagError::Embedding(format!("inference: {}", e)))?;

        // Token-level output [batch, seq_len, hidden]; pool to a sentence
        // vector weighted by the attention mask so padding is ignored.
        let token_embeddings = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| RagError::Embedding(format!("output tensor: {}", e)))?;
        let tokens = token_embeddings.index_axis(Axis(0), 0);
        let hidden = tokens.shape()[1];

        let mut pooled = vec![0.0f32; hidden];
        let mut mask_sum = 0.0f32;
        for (i, &mask) in mask_for_pooling.iter().enumerate() {
            let mask = mask as f32;
            mask_sum += mask;
            for j in 0..hidden {
                pooled[j] += tokens[[i, j]] * mask;
            }
        }
        for value in &mut pooled {
            *value /= mask_sum.max(1e-9);
        }

        let norm = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut pooled {
                *value /= norm;
            }
        }

        if pooled.len() != EMBEDDING_DIMENSION {
            return Err(RagError::Embedding(format!(
                "unexpected embedding dimension {} (expected {})",
                pooled.len(),
                EMBEDDING_DIMENSION
            )));
        }

        Ok(pooled)
    }
}

#[async_trait]
impl SentenceEncoder for OnnxEncoder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(RagError::Embedding("input text is empty".into()));
        }
        self.run_inference(text)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}
