// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Supply-chain RAG assistant CLI
#[derive(Parser, Debug)]
#[command(name = "chainsight")]
#[command(version)]
#[command(about = "Graph-backed retrieval-augmented assistant for supply-chain data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify the graph store and the generative API are reachable
    Check,

    /// Import the dataset into the graph store and build the vector index
    Load,

    /// Start the chat HTTP interface
    Serve,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env()?;
    match cli.command {
        Commands::Check => commands::run_check(&config).await,
        Commands::Load => commands::run_load(&config).await,
        Commands::Serve => commands::run_serve(&config).await,
    }
}
