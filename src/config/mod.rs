// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Environment-backed configuration.
//!
//! All external endpoints and credentials come from environment variables,
//! optionally seeded from a `.env` file by the binaries before this module
//! runs. Required variables fail fast with a `Configuration` error naming
//! the variable.

use std::env;
use std::path::PathBuf;

use crate::error::{RagError, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "data";

/// Runtime configuration for every command.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bolt URI of the graph store, e.g. `bolt://localhost:7687`.
    pub neo4j_uri: String,
    pub neo4j_username: String,
    pub neo4j_password: String,

    /// API key for the generative service.
    pub gemini_api_key: String,
    /// Generative model identifier.
    pub gemini_model: String,

    /// Port for the chat HTTP server.
    pub api_port: u16,

    /// Directory holding the dataset JSON files.
    pub data_dir: PathBuf,

    /// Directory with `model.onnx` + `tokenizer.json` for the sentence
    /// encoder. When unset, the deterministic fallback encoder is used.
    pub embedding_model_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            neo4j_uri: required("NEO4J_URI")?,
            neo4j_username: required("NEO4J_USERNAME")?,
            neo4j_password: required("NEO4J_PASSWORD")?,
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            api_port: optional_parsed("API_PORT")?.unwrap_or(DEFAULT_API_PORT),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            embedding_model_dir: env::var("EMBEDDING_MODEL_DIR").ok().map(PathBuf::from),
        })
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(RagError::config(name, "set but empty")),
        Err(_) => Err(RagError::config(name, "not set")),
    }
}

fn optional_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| RagError::config(name, format!("invalid value {:?}", raw))),
        Err(_) => Ok(None),
    }
}
