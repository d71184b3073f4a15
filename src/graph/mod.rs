// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Supply-chain graph model and storage backends.
//!
//! Nodes: `Product`, `Supplier`, `Warehouse`. Edges:
//! `(:Supplier)-[:SUPPLIES]->(:Product)`,
//! `(:Product)-[:STORED_AT]->(:Warehouse)` and
//! `(:Warehouse)-[:CONNECTED_TO {distance, duration}]->(:Warehouse)`.
//!
//! All writes are idempotent upserts keyed by the entity `id`; re-running an
//! import refreshes attributes without duplicating nodes or edges.

pub mod memory;
pub mod neo4j;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use memory::MemoryStore;
pub use neo4j::Neo4jStore;

/// Name of the cosine vector index over `Product.description_embedding`.
pub const PRODUCT_EMBEDDING_INDEX: &str = "product_description_embeddings";

/// Default number of products retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub location: String,
    pub specialization: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub capacity: i64,
}

/// Transport link between two warehouses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from: String,
    pub to: String,
    /// Distance in kilometers.
    pub distance: f64,
    /// Transit time in hours.
    pub duration: f64,
}

/// Sourcing/storage relationship for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub supplier_id: String,
    pub product_id: String,
    pub warehouse_id: String,
}

/// A warehouse as it appears in retrieved context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSite {
    pub name: String,
    pub location: String,
}

/// One retrieved product with its graph neighborhood.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductContext {
    pub product: Product,
    /// Similarity score reported by the index. Tie order between equal
    /// scores is whatever the backend returns.
    pub score: f64,
    pub suppliers: Vec<String>,
    pub warehouses: Vec<StorageSite>,
}

/// Storage backend seam.
///
/// `Neo4jStore` is the production implementation; `MemoryStore` backs the
/// test suite with the same semantics.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Cheap round-trip proving the store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Create the product embedding vector index if it does not exist.
    async fn ensure_vector_index(&self, dimension: usize) -> Result<()>;

    async fn upsert_product(&self, product: &Product, embedding: &[f32]) -> Result<()>;

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<()>;

    async fn upsert_warehouse(&self, warehouse: &Warehouse) -> Result<()>;

    async fn link_route(&self, route: &Route) -> Result<()>;

    /// Create the SUPPLIES and STORED_AT edges for one relationship record.
    /// Edges are only created between nodes that already exist.
    async fn link_relationship(&self, relationship: &Relationship) -> Result<()>;

    /// Nearest-neighbor search over product embeddings, each hit joined with
    /// its directly connected suppliers and warehouses. An empty or missing
    /// index yields an empty vec, never an error.
    async fn top_products(&self, embedding: &[f32], k: usize) -> Result<Vec<ProductContext>>;
}
