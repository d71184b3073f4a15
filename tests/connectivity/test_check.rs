// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! The `check` command against unreachable services: failures are reported
//! per service and the command errors without panicking.

use std::path::PathBuf;

use chainsight::cli::commands::{connectivity_checks, run_check};
use chainsight::{AppConfig, Neo4jStore};

fn unreachable_config() -> AppConfig {
    AppConfig {
        // Port 9 (discard) on loopback: connection refused, fast.
        neo4j_uri: "bolt://127.0.0.1:9".into(),
        neo4j_username: "neo4j".into(),
        neo4j_password: "wrong".into(),
        gemini_api_key: "invalid-key".into(),
        gemini_model: "gemini-1.5-flash".into(),
        api_port: 8080,
        data_dir: PathBuf::from("data"),
        embedding_model_dir: None,
    }
}

#[tokio::test]
async fn test_unreachable_graph_store_is_connectivity_error() {
    let err = Neo4jStore::connect("bolt://127.0.0.1:9", "neo4j", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CONNECTIVITY");
}

#[tokio::test]
async fn test_graph_check_reports_failure_without_crashing() {
    let checks = connectivity_checks(&unreachable_config()).await;

    let graph = checks.iter().find(|c| c.service == "Neo4j").unwrap();
    assert!(graph.result.is_err());
}

#[tokio::test]
async fn test_check_command_fails_overall() {
    // Non-zero process exit comes from main propagating this error.
    let result = run_check(&unreachable_config()).await;
    assert!(result.is_err());
}
