// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! In-process [`GraphStore`] with the same upsert and retrieval semantics
//! as the Neo4j backend. Backs the test suite and credential-free local
//! runs; similarity is a cosine scan instead of an ANN index, which is
//! exact and fine at test scale.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    GraphStore, Product, ProductContext, Relationship, Route, StorageSite, Supplier, Warehouse,
};
use crate::error::Result;

#[derive(Default)]
struct Inner {
    products: BTreeMap<String, (Product, Vec<f32>)>,
    suppliers: BTreeMap<String, Supplier>,
    warehouses: BTreeMap<String, Warehouse>,
    supplies: BTreeSet<(String, String)>,
    stored_at: BTreeSet<(String, String)>,
    routes: BTreeMap<(String, String), (f64, f64)>,
    index_dimension: Option<usize>,
}

/// In-memory graph store. Cheap to construct per test.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of product nodes currently stored.
    pub fn product_count(&self) -> usize {
        self.inner.lock().unwrap().products.len()
    }

    /// Number of supplier nodes currently stored.
    pub fn supplier_count(&self) -> usize {
        self.inner.lock().unwrap().suppliers.len()
    }

    /// Number of warehouse nodes currently stored.
    pub fn warehouse_count(&self) -> usize {
        self.inner.lock().unwrap().warehouses.len()
    }

    /// Dimension the vector index was created with, if any.
    pub fn index_dimension(&self) -> Option<usize> {
        self.inner.lock().unwrap().index_dimension
    }

    /// Stored embedding for a product id, if present.
    pub fn embedding_of(&self, product_id: &str) -> Option<Vec<f32>> {
        self.inner
            .lock()
            .unwrap()
            .products
            .get(product_id)
            .map(|(_, embedding)| embedding.clone())
    }

    fn cosine(a: &[f32], b: &[f32]) -> f64 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        (dot / (norm_a * norm_b)) as f64
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_vector_index(&self, dimension: usize) -> Result<()> {
        self.inner.lock().unwrap().index_dimension = Some(dimension);
        Ok(())
    }

    async fn upsert_product(&self, product: &Product, embedding: &[f32]) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .products
            .insert(product.id.clone(), (product.clone(), embedding.to_vec()));
        Ok(())
    }

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .suppliers
            .insert(supplier.id.clone(), supplier.clone());
        Ok(())
    }

    async fn upsert_warehouse(&self, warehouse: &Warehouse) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .warehouses
            .insert(warehouse.id.clone(), warehouse.clone());
        Ok(())
    }

    async fn link_route(&self, route: &Route) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        // Edges only between existing nodes, as in the Cypher MATCH+MERGE.
        if inner.warehouses.contains_key(&route.from) && inner.warehouses.contains_key(&route.to) {
            inner.routes.insert(
                (route.from.clone(), route.to.clone()),
                (route.distance, route.duration),
            );
        }
        Ok(())
    }

    async fn link_relationship(&self, relationship: &Relationship) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.suppliers.contains_key(&relationship.supplier_id)
            && inner.products.contains_key(&relationship.product_id)
        {
            inner.supplies.insert((
                relationship.supplier_id.clone(),
                relationship.product_id.clone(),
            ));
        }
        if inner.products.contains_key(&relationship.product_id)
            && inner.warehouses.contains_key(&relationship.warehouse_id)
        {
            inner.stored_at.insert((
                relationship.product_id.clone(),
                relationship.warehouse_id.clone(),
            ));
        }
        Ok(())
    }

    async fn top_products(&self, embedding: &[f32], k: usize) -> Result<Vec<ProductContext>> {
        let inner = self.inner.lock().unwrap();

        let mut scored: Vec<(f64, &Product)> = inner
            .products
            .values()
            .map(|(product, stored)| (Self::cosine(embedding, stored), product))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let results = scored
            .into_iter()
            .take(k)
            .map(|(score, product)| {
                let suppliers = inner
                    .supplies
                    .iter()
                    .filter(|(_, pid)| pid == &product.id)
                    .filter_map(|(sid, _)| inner.suppliers.get(sid))
                    .map(|s| s.name.clone())
                    .collect();
                let warehouses = inner
                    .stored_at
                    .iter()
                    .filter(|(pid, _)| pid == &product.id)
                    .filter_map(|(_, wid)| inner.warehouses.get(wid))
                    .map(|w| StorageSite {
                        name: w.name.clone(),
                        location: w.location.clone(),
                    })
                    .collect();
                ProductContext {
                    product: product.clone(),
                    score,
                    suppliers,
                    warehouses,
                }
            })
            .collect();

        Ok(results)
    }
}
