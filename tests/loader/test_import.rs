// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Import behavior against the in-memory store: idempotence, embedding
//! invariants, and per-record error tolerance.

use std::path::Path;
use std::sync::Arc;

use chainsight::{
    DataLoader, GraphStore, HashEncoder, MemoryStore, SentenceEncoder, EMBEDDING_DIMENSION,
};

fn write_dataset(dir: &Path) {
    std::fs::write(
        dir.join("products.json"),
        r#"[
            {"id": "P001", "name": "Laptop", "description": "High performance laptop",
             "price": 1299.99, "category": "Electronics"},
            {"id": "P002", "name": "Smartphone", "description": "5G smartphone",
             "price": 899.0, "category": "Electronics"}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("suppliers.json"),
        r#"[
            {"id": "S001", "name": "TechSource Ltd", "location": "Shenzhen",
             "specialization": "Computing hardware"}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("warehouses.json"),
        r#"[
            {"id": "W001", "name": "Central", "location": "Berlin", "capacity": 50000},
            {"id": "W002", "name": "North Hub", "location": "Hamburg", "capacity": 30000}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("routes.json"),
        r#"[
            {"from": "W001", "to": "W002", "distance": 289.0, "duration": 3.5}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("relationships.json"),
        r#"[
            {"supplier_id": "S001", "product_id": "P001", "warehouse_id": "W001"}
        ]"#,
    )
    .unwrap();
}

#[tokio::test]
async fn test_full_import_counts() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let encoder = HashEncoder::default();
    let store = MemoryStore::new();
    let loader = DataLoader::new(&encoder, &store);

    let summary = loader.load_all(dir.path()).await.unwrap();
    assert_eq!(summary.products, 2);
    assert_eq!(summary.suppliers, 1);
    assert_eq!(summary.warehouses, 2);
    assert_eq!(summary.routes, 1);
    assert_eq!(summary.relationships, 1);
    assert_eq!(summary.skipped, 0);

    assert_eq!(store.product_count(), 2);
    assert_eq!(store.index_dimension(), Some(EMBEDDING_DIMENSION));
}

#[tokio::test]
async fn test_every_product_gets_fixed_dimension_embedding() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let encoder = HashEncoder::default();
    let store = MemoryStore::new();
    DataLoader::new(&encoder, &store)
        .load_all(dir.path())
        .await
        .unwrap();

    for id in ["P001", "P002"] {
        let embedding = store.embedding_of(id).unwrap();
        assert_eq!(embedding.len(), EMBEDDING_DIMENSION);
    }
}

#[tokio::test]
async fn test_double_load_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let encoder = HashEncoder::default();
    let store = MemoryStore::new();
    let loader = DataLoader::new(&encoder, &store);

    loader.load_all(dir.path()).await.unwrap();
    let first_embedding = store.embedding_of("P001").unwrap();
    loader.load_all(dir.path()).await.unwrap();

    // One node per natural key, embedding consistent with the description.
    assert_eq!(store.product_count(), 2);
    assert_eq!(store.supplier_count(), 1);
    assert_eq!(store.warehouse_count(), 2);
    assert_eq!(store.embedding_of("P001").unwrap(), first_embedding);
}

#[tokio::test]
async fn test_malformed_record_skipped_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    // Second product loses its description; first stays valid.
    std::fs::write(
        dir.path().join("products.json"),
        r#"[
            {"id": "P001", "name": "Laptop", "description": "High performance laptop",
             "price": 1299.99, "category": "Electronics"},
            {"id": "P-bad", "name": "Mystery", "price": 1.0, "category": "Unknown"}
        ]"#,
    )
    .unwrap();

    let encoder = HashEncoder::default();
    let store = MemoryStore::new();
    let summary = DataLoader::new(&encoder, &store)
        .load_all(dir.path())
        .await
        .unwrap();

    assert_eq!(summary.products, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.product_count(), 1);
    assert!(store.embedding_of("P001").is_some());
    assert!(store.embedding_of("P-bad").is_none());
}

#[tokio::test]
async fn test_unembeddable_description_skipped_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    // First product has a whitespace-only description the encoder rejects;
    // the valid record after it and the other entity files must still load.
    std::fs::write(
        dir.path().join("products.json"),
        r#"[
            {"id": "P-blank", "name": "Blank", "description": "   ",
             "price": 1.0, "category": "Unknown"},
            {"id": "P001", "name": "Laptop", "description": "High performance laptop",
             "price": 1299.99, "category": "Electronics"}
        ]"#,
    )
    .unwrap();

    let encoder = HashEncoder::default();
    let store = MemoryStore::new();
    let summary = DataLoader::new(&encoder, &store)
        .load_all(dir.path())
        .await
        .unwrap();

    assert_eq!(summary.products, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.suppliers, 1);
    assert_eq!(summary.warehouses, 2);
    assert_eq!(summary.routes, 1);
    assert_eq!(summary.relationships, 1);
    assert!(store.embedding_of("P001").is_some());
    assert!(store.embedding_of("P-blank").is_none());
}

#[tokio::test]
async fn test_load_embedding_matches_query_time_encoding() {
    // The invariant behind retrieval quality: encoding a description at
    // query time reproduces the stored load-time embedding exactly.
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let encoder: Arc<dyn SentenceEncoder> = Arc::new(HashEncoder::default());
    let store = MemoryStore::new();
    DataLoader::new(encoder.as_ref(), &store)
        .load_all(dir.path())
        .await
        .unwrap();

    let query_time = encoder.embed("High performance laptop").await.unwrap();
    assert_eq!(store.embedding_of("P001").unwrap(), query_time);

    let hits = store.top_products(&query_time, 2).await.unwrap();
    assert_eq!(hits[0].product.id, "P001");
    assert!(hits[0].score > 0.999);
}
