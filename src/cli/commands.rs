// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Implementations of the `check`, `load`, and `serve` subcommands.

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::api::{self, AppState};
use crate::config::AppConfig;
use crate::embeddings::encoder_from_config;
use crate::error::RagError;
use crate::generation::GeminiGenerator;
use crate::graph::{GraphStore, Neo4jStore};
use crate::loader::DataLoader;
use crate::pipeline::AnswerPipeline;
use crate::retrieval::ContextRetriever;

/// Outcome of probing one external service.
#[derive(Debug)]
pub struct ServiceCheck {
    pub service: &'static str,
    pub result: std::result::Result<(), RagError>,
}

impl ServiceCheck {
    fn report(&self) {
        match &self.result {
            Ok(()) => println!("✅ {} connection successful", self.service),
            Err(e) => println!("❌ {} connection failed: {}", self.service, e),
        }
    }
}

/// Probe the graph store and the generative API.
pub async fn connectivity_checks(config: &AppConfig) -> Vec<ServiceCheck> {
    let graph_result = match Neo4jStore::connect(
        &config.neo4j_uri,
        &config.neo4j_username,
        &config.neo4j_password,
    )
    .await
    {
        Ok(store) => store.ping().await,
        Err(e) => Err(e),
    };

    let gemini_result = match GeminiGenerator::new(config.gemini_api_key.as_str(), config.gemini_model.as_str()) {
        Ok(generator) => generator.ping().await,
        Err(e) => Err(e),
    };

    vec![
        ServiceCheck {
            service: "Neo4j",
            result: graph_result,
        },
        ServiceCheck {
            service: "Gemini API",
            result: gemini_result,
        },
    ]
}

pub async fn run_check(config: &AppConfig) -> Result<()> {
    println!("Testing connections...");
    let checks = connectivity_checks(config).await;
    for check in &checks {
        check.report();
    }

    let failed = checks.iter().filter(|c| c.result.is_err()).count();
    if failed > 0 {
        Err(anyhow!("{} of {} connectivity checks failed", failed, checks.len()))
    } else {
        Ok(())
    }
}

pub async fn run_load(config: &AppConfig) -> Result<()> {
    let encoder = encoder_from_config(config).await?;
    let store = Neo4jStore::connect(
        &config.neo4j_uri,
        &config.neo4j_username,
        &config.neo4j_password,
    )
    .await?;

    let loader = DataLoader::new(encoder.as_ref(), &store);
    let summary = loader.load_all(&config.data_dir).await?;
    println!("Data loading completed: {}", summary);
    Ok(())
}

pub async fn run_serve(config: &AppConfig) -> Result<()> {
    let encoder = encoder_from_config(config).await?;
    let store: Arc<dyn GraphStore> = Arc::new(
        Neo4jStore::connect(
            &config.neo4j_uri,
            &config.neo4j_username,
            &config.neo4j_password,
        )
        .await?,
    );

    let retriever = ContextRetriever::new(encoder, store);
    let generator = Arc::new(GeminiGenerator::new(
        config.gemini_api_key.as_str(),
        config.gemini_model.as_str(),
    )?);
    let pipeline = Arc::new(AnswerPipeline::new(retriever, generator));

    api::serve(AppState::new(pipeline), config.api_port).await
}
