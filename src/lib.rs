// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Retrieval-augmented assistant for a supply-chain graph.
//!
//! Wiring: a Neo4j graph store holds products, suppliers, warehouses, and
//! transport routes; product descriptions carry MiniLM sentence embeddings
//! behind a cosine vector index; questions are embedded with the same
//! encoder, matched against the index, and answered by the Gemini API with
//! the retrieved neighborhood as context.

pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod graph;
pub mod loader;
pub mod pipeline;
pub mod retrieval;

pub use config::AppConfig;
pub use embeddings::{HashEncoder, OnnxEncoder, SentenceEncoder, EMBEDDING_DIMENSION};
pub use error::{RagError, Result};
pub use generation::{AnswerGenerator, GeminiGenerator};
pub use graph::{
    GraphStore, MemoryStore, Neo4jStore, Product, ProductContext, Relationship, Route,
    StorageSite, Supplier, Warehouse,
};
pub use loader::{DataLoader, LoadSummary};
pub use pipeline::{Answer, AnswerPipeline};
pub use retrieval::{ContextRetriever, RetrievedContext};
