// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Question-time context retrieval.
//!
//! Embeds the question with the same encoder used at load time, runs a
//! nearest-neighbor query over the product index, and flattens the hits
//! into the plain-text context bundle the generator is prompted with.

use std::sync::Arc;

use tracing::debug;

use crate::embeddings::SentenceEncoder;
use crate::error::Result;
use crate::graph::{GraphStore, ProductContext, DEFAULT_TOP_K};

/// Context bundle for one question. May be empty; an empty bundle is a
/// valid state the generator still runs with.
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    pub hits: Vec<ProductContext>,
}

impl RetrievedContext {
    pub fn empty() -> Self {
        Self { hits: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Serialize the hits for the prompt, one block per product:
    /// product, description, suppliers, storage sites, separated by `---`.
    pub fn as_prompt_text(&self) -> String {
        if self.hits.is_empty() {
            return "No relevant context found.".to_string();
        }

        let mut lines = Vec::new();
        for hit in &self.hits {
            lines.push(format!("Product: {}", hit.product.name));
            lines.push(format!("Description: {}", hit.product.description));
            lines.push(format!("Category: {}", hit.product.category));
            lines.push(format!("Price: {}", hit.product.price));
            for supplier in &hit.suppliers {
                lines.push(format!("Supplied by: {}", supplier));
            }
            for site in &hit.warehouses {
                lines.push(format!("Stored at: {} in {}", site.name, site.location));
            }
            lines.push("---".to_string());
        }
        lines.join("\n")
    }
}

/// Embeds questions and queries the graph store for nearby products.
pub struct ContextRetriever {
    encoder: Arc<dyn SentenceEncoder>,
    store: Arc<dyn GraphStore>,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(encoder: Arc<dyn SentenceEncoder>, store: Arc<dyn GraphStore>) -> Self {
        Self {
            encoder,
            store,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Retrieve context for a question. Empty retrieval is Ok, not an error.
    pub async fn retrieve(&self, question: &str) -> Result<RetrievedContext> {
        let embedding = self.encoder.embed(question).await?;
        let hits = self.store.top_products(&embedding, self.top_k).await?;
        debug!(hits = hits.len(), "context retrieved");
        Ok(RetrievedContext { hits })
    }
}
