// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::settings::SearchSettings;
use crate::domain::models::search_result::SearchResult;
use crate::domain::search::engine::{SearchEngine, SearchError};

/// 未配置密钥时读取的环境变量
pub const API_KEY_ENV: &str = "SERPER_API_KEY";

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    link: Option<String>,
    snippet: Option<String>,
}

/// Serper 搜索引擎实现
///
/// 以 JSON POST 调用 Serper 的 Google 搜索接口，只取自然搜索结果的链接
pub struct SerperSearchEngine {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SerperSearchEngine {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// 从配置创建，密钥缺失时回退到 `SERPER_API_KEY`
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok());
        Self::new(settings.endpoint.clone(), api_key)
    }
}

#[async_trait]
impl SearchEngine for SerperSearchEngine {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::MissingCredential(API_KEY_ENV.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&SerperRequest { q: query, num: limit })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Serper API error");
            return Err(SearchError::EngineError(format!(
                "Serper API error ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let body: SerperResponse = response
            .json()
            .await
            .map_err(|e| SearchError::EngineError(format!("Invalid Serper response: {}", e)))?;

        let results: Vec<SearchResult> = body
            .organic
            .into_iter()
            .filter_map(|item| {
                item.link.map(|link| {
                    SearchResult::new(item.title, link, item.snippet, self.name().to_string())
                })
            })
            .take(limit as usize)
            .collect();

        debug!("Serper returned {} organic results", results.len());
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "serper"
    }
}
