// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::search_result::SearchResult;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SearchError {
    #[error("Search credential missing: {0}")]
    MissingCredential(String),
    #[error("Search engine error: {0}")]
    EngineError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Timeout")]
    Timeout,
}

#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Perform a search query, returning at most `limit` results in ranking order
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>, SearchError>;

    /// Get the name of the search engine
    fn name(&self) -> &'static str;
}
