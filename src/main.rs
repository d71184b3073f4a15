// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;

use chainsight::cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env during development.
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
