// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! One-shot dataset import.
//!
//! Reads the five dataset files (`products.json`, `suppliers.json`,
//! `warehouses.json`, `routes.json`, `relationships.json`) from the data
//! directory, validates each record, embeds product descriptions, and
//! upserts everything into the graph store.
//!
//! Import is tolerant per record: a malformed record is logged, counted as
//! skipped, and the rest of the batch proceeds. Re-running the import is
//! safe; every write is an upsert by natural key.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::embeddings::SentenceEncoder;
use crate::error::{RagError, Result};
use crate::graph::{GraphStore, Product, Relationship, Route, Supplier, Warehouse};

pub const PRODUCTS_FILE: &str = "products.json";
pub const SUPPLIERS_FILE: &str = "suppliers.json";
pub const WAREHOUSES_FILE: &str = "warehouses.json";
pub const ROUTES_FILE: &str = "routes.json";
pub const RELATIONSHIPS_FILE: &str = "relationships.json";

/// Counters reported after an import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub products: usize,
    pub suppliers: usize,
    pub warehouses: usize,
    pub routes: usize,
    pub relationships: usize,
    /// Records rejected by validation, across all files.
    pub skipped: usize,
}

impl std::fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} products, {} suppliers, {} warehouses, {} routes, {} relationships ({} skipped)",
            self.products,
            self.suppliers,
            self.warehouses,
            self.routes,
            self.relationships,
            self.skipped
        )
    }
}

/// Imports the dataset into a graph store through a shared encoder.
pub struct DataLoader<'a> {
    encoder: &'a dyn SentenceEncoder,
    store: &'a dyn GraphStore,
}

impl<'a> DataLoader<'a> {
    pub fn new(encoder: &'a dyn SentenceEncoder, store: &'a dyn GraphStore) -> Self {
        Self { encoder, store }
    }

    /// Run the full import from a data directory.
    pub async fn load_all(&self, data_dir: &Path) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();

        // The index must exist before the first product write so every
        // embedding lands indexed.
        self.store
            .ensure_vector_index(self.encoder.dimension())
            .await?;

        info!("loading products");
        let (products, skipped) = read_records::<Product>(&data_dir.join(PRODUCTS_FILE), "product")?;
        summary.skipped += skipped;
        for product in &products {
            // A record can pass shape validation and still be unembeddable
            // (e.g. whitespace-only description); skip it like any other
            // malformed record instead of aborting the batch.
            let embedding = match self.encoder.embed(&product.description).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    let err = RagError::Import {
                        entity: "product",
                        key: product.id.clone(),
                        reason: format!("embedding failed: {}", e),
                    };
                    warn!(error = %err, "skipping malformed record");
                    summary.skipped += 1;
                    continue;
                }
            };
            self.store.upsert_product(product, &embedding).await?;
            summary.products += 1;
        }

        info!("loading suppliers");
        let (suppliers, skipped) =
            read_records::<Supplier>(&data_dir.join(SUPPLIERS_FILE), "supplier")?;
        summary.skipped += skipped;
        for supplier in &suppliers {
            self.store.upsert_supplier(supplier).await?;
            summary.suppliers += 1;
        }

        info!("loading warehouses");
        let (warehouses, skipped) =
            read_records::<Warehouse>(&data_dir.join(WAREHOUSES_FILE), "warehouse")?;
        summary.skipped += skipped;
        for warehouse in &warehouses {
            self.store.upsert_warehouse(warehouse).await?;
            summary.warehouses += 1;
        }

        info!("loading transport routes");
        let (routes, skipped) = read_records::<Route>(&data_dir.join(ROUTES_FILE), "route")?;
        summary.skipped += skipped;
        for route in &routes {
            self.store.link_route(route).await?;
            summary.routes += 1;
        }

        info!("creating supply and storage relationships");
        let (relationships, skipped) =
            read_records::<Relationship>(&data_dir.join(RELATIONSHIPS_FILE), "relationship")?;
        summary.skipped += skipped;
        for relationship in &relationships {
            self.store.link_relationship(relationship).await?;
            summary.relationships += 1;
        }

        info!(%summary, "import finished");
        Ok(summary)
    }
}

/// Parse one dataset file into typed records.
///
/// The file must be a JSON array. Each element is converted independently so
/// one malformed record (missing attribute, wrong type) is reported and
/// skipped without failing the batch. An unreadable or non-array file is a
/// hard error.
fn read_records<T: DeserializeOwned>(path: &Path, entity: &'static str) -> Result<(Vec<T>, usize)> {
    let raw = std::fs::read_to_string(path)?;
    let values: Vec<Value> = serde_json::from_str(&raw).map_err(|e| RagError::Import {
        entity,
        key: path.display().to_string(),
        reason: format!("not a JSON array: {}", e),
    })?;

    let mut records = Vec::with_capacity(values.len());
    let mut skipped = 0;
    for (position, value) in values.into_iter().enumerate() {
        let key = value
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("#{}", position));
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                let err = RagError::Import {
                    entity,
                    key,
                    reason: e.to_string(),
                };
                warn!(error = %err, "skipping malformed record");
                skipped += 1;
            }
        }
    }
    Ok((records, skipped))
}
