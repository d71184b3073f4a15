// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Neo4j-backed [`GraphStore`] using the `neo4rs` bolt driver.
//!
//! All writes are `MERGE` statements keyed on the `id` property, matching
//! the idempotent-upsert contract. Retrieval goes through the named vector
//! index via `db.index.vector.queryNodes`.

use async_trait::async_trait;
use neo4rs::{query, Graph};
use tracing::{debug, instrument};

use super::{
    GraphStore, Product, ProductContext, Relationship, Route, StorageSite, Supplier, Warehouse,
    PRODUCT_EMBEDDING_INDEX,
};
use crate::error::{RagError, Result};

/// Connection handle to the graph database. Cloning shares the underlying
/// connection pool; the driver owns pooling and retries internally.
#[derive(Clone)]
pub struct Neo4jStore {
    graph: Graph,
}

impl std::fmt::Debug for Neo4jStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jStore").finish_non_exhaustive()
    }
}

impl Neo4jStore {
    /// Open a connection pool against a bolt URI. The driver connects
    /// eagerly, so an unreachable store surfaces here as a `Connectivity`
    /// error rather than on the first query.
    pub async fn connect(uri: &str, username: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, username, password)
            .await
            .map_err(|e| RagError::unreachable("Neo4j", e.to_string()))?;
        Ok(Self { graph })
    }

    fn embedding_param(embedding: &[f32]) -> Vec<f64> {
        embedding.iter().map(|&v| v as f64).collect()
    }

    /// Collected `[w.name, w.location]` pairs can still carry a null half
    /// (the Cypher filter only checks the name); keep complete pairs only.
    fn storage_sites(pairs: Vec<Vec<Option<String>>>) -> Vec<StorageSite> {
        pairs
            .into_iter()
            .filter_map(|pair| {
                let mut pair = pair.into_iter();
                Some(StorageSite {
                    name: pair.next()??,
                    location: pair.next()??,
                })
            })
            .collect()
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn ping(&self) -> Result<()> {
        let mut rows = self
            .graph
            .execute(query("RETURN 1 AS probe"))
            .await
            .map_err(|e| RagError::unreachable("Neo4j", e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| RagError::unreachable("Neo4j", e.to_string()))?
            .ok_or_else(|| RagError::unreachable("Neo4j", "probe query returned no rows"))?;
        let probe: i64 = row
            .get("probe")
            .map_err(|e| RagError::Decode(e.to_string()))?;
        if probe != 1 {
            return Err(RagError::unreachable("Neo4j", "probe query returned wrong value"));
        }
        Ok(())
    }

    async fn ensure_vector_index(&self, dimension: usize) -> Result<()> {
        // Index options cannot be parameterized, so the dimension is baked
        // into the statement text.
        let statement = format!(
            "CREATE VECTOR INDEX {PRODUCT_EMBEDDING_INDEX} IF NOT EXISTS \
             FOR (p:Product) ON (p.description_embedding) \
             OPTIONS {{indexConfig: {{ \
                `vector.dimensions`: {dimension}, \
                `vector.similarity_function`: 'cosine' \
             }}}}"
        );
        self.graph.run(query(&statement)).await?;
        debug!(index = PRODUCT_EMBEDDING_INDEX, dimension, "vector index ensured");
        Ok(())
    }

    #[instrument(skip_all, fields(id = %product.id))]
    async fn upsert_product(&self, product: &Product, embedding: &[f32]) -> Result<()> {
        self.graph
            .run(
                query(
                    "MERGE (p:Product {id: $id}) \
                     SET p.name = $name, \
                         p.description = $description, \
                         p.price = $price, \
                         p.category = $category, \
                         p.description_embedding = $embedding",
                )
                .param("id", product.id.as_str())
                .param("name", product.name.as_str())
                .param("description", product.description.as_str())
                .param("price", product.price)
                .param("category", product.category.as_str())
                .param("embedding", Self::embedding_param(embedding)),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(id = %supplier.id))]
    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<()> {
        self.graph
            .run(
                query(
                    "MERGE (s:Supplier {id: $id}) \
                     SET s.name = $name, \
                         s.location = $location, \
                         s.specialization = $specialization",
                )
                .param("id", supplier.id.as_str())
                .param("name", supplier.name.as_str())
                .param("location", supplier.location.as_str())
                .param("specialization", supplier.specialization.as_str()),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(id = %warehouse.id))]
    async fn upsert_warehouse(&self, warehouse: &Warehouse) -> Result<()> {
        self.graph
            .run(
                query(
                    "MERGE (w:Warehouse {id: $id}) \
                     SET w.name = $name, \
                         w.location = $location, \
                         w.capacity = $capacity",
                )
                .param("id", warehouse.id.as_str())
                .param("name", warehouse.name.as_str())
                .param("location", warehouse.location.as_str())
                .param("capacity", warehouse.capacity),
            )
            .await?;
        Ok(())
    }

    async fn link_route(&self, route: &Route) -> Result<()> {
        self.graph
            .run(
                query(
                    "MATCH (a:Warehouse {id: $from}) \
                     MATCH (b:Warehouse {id: $to}) \
                     MERGE (a)-[r:CONNECTED_TO]->(b) \
                     SET r.distance = $distance, \
                         r.duration = $duration",
                )
                .param("from", route.from.as_str())
                .param("to", route.to.as_str())
                .param("distance", route.distance)
                .param("duration", route.duration),
            )
            .await?;
        Ok(())
    }

    async fn link_relationship(&self, relationship: &Relationship) -> Result<()> {
        self.graph
            .run(
                query(
                    "MATCH (s:Supplier {id: $supplier_id}) \
                     MATCH (p:Product {id: $product_id}) \
                     MERGE (s)-[:SUPPLIES]->(p)",
                )
                .param("supplier_id", relationship.supplier_id.as_str())
                .param("product_id", relationship.product_id.as_str()),
            )
            .await?;
        self.graph
            .run(
                query(
                    "MATCH (p:Product {id: $product_id}) \
                     MATCH (w:Warehouse {id: $warehouse_id}) \
                     MERGE (p)-[:STORED_AT]->(w)",
                )
                .param("product_id", relationship.product_id.as_str())
                .param("warehouse_id", relationship.warehouse_id.as_str()),
            )
            .await?;
        Ok(())
    }

    async fn top_products(&self, embedding: &[f32], k: usize) -> Result<Vec<ProductContext>> {
        let statement = format!(
            "CALL db.index.vector.queryNodes('{PRODUCT_EMBEDDING_INDEX}', $k, $embedding) \
             YIELD node AS p, score \
             OPTIONAL MATCH (p)<-[:SUPPLIES]-(s:Supplier) \
             OPTIONAL MATCH (p)-[:STORED_AT]->(w:Warehouse) \
             RETURN p.id AS id, p.name AS name, p.description AS description, \
                    p.price AS price, p.category AS category, score, \
                    [x IN collect(DISTINCT s.name) WHERE x IS NOT NULL] AS suppliers, \
                    [pair IN collect(DISTINCT [w.name, w.location]) \
                     WHERE pair[0] IS NOT NULL] AS warehouses \
             ORDER BY score DESC"
        );

        let mut rows = match self
            .graph
            .execute(
                query(&statement)
                    .param("k", k as i64)
                    .param("embedding", Self::embedding_param(embedding)),
            )
            .await
        {
            Ok(rows) => rows,
            // A graph that was never loaded has no index; that is the
            // documented empty-context state, not a failure.
            Err(e) if e.to_string().contains("no such vector schema index") => {
                debug!("vector index absent, returning empty context");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RagError::Graph(e)),
        };

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let decode = |e: neo4rs::DeError| RagError::Decode(e.to_string());
            let warehouses: Vec<Vec<Option<String>>> = row.get("warehouses").map_err(decode)?;
            results.push(ProductContext {
                product: Product {
                    id: row.get("id").map_err(decode)?,
                    name: row.get("name").map_err(decode)?,
                    description: row.get("description").map_err(decode)?,
                    price: row.get("price").map_err(decode)?,
                    category: row.get("category").map_err(decode)?,
                },
                score: row.get("score").map_err(decode)?,
                suppliers: row.get("suppliers").map_err(decode)?,
                warehouses: Self::storage_sites(warehouses),
            });
        }
        Ok(results)
    }
}
