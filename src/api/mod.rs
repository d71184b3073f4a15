// Copyright (c) 2025 Chainsight
// SPDX-License-Identifier: Apache-2.0

//! Chat HTTP interface.

pub mod http_server;

pub use http_server::{router, serve, AppState, ChatRequest, ChatResponse};
