// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::settings::ScraperSettings;
use crate::domain::models::scrape_result::ScrapeResult;
use crate::domain::search::engine::{SearchEngine, SearchError};
use crate::domain::search::query::build_dork;
use crate::domain::services::extraction_service::ExtractionService;
use crate::domain::services::site_filter;
use crate::engines::traits::{ScrapeRequest, ScraperEngine};

#[derive(Error, Debug)]
pub enum LeadServiceError {
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
}

/// 线索服务
///
/// 按行业和地点搜索候选页面，逐个抓取并提取联系信息。
/// 抓取严格顺序执行，单个页面失败只会产生一条带错误的结果。
pub struct LeadService {
    search_engine: Arc<dyn SearchEngine>,
    scraper: Arc<dyn ScraperEngine>,
    settings: ScraperSettings,
    max_search_results: u32,
}

impl LeadService {
    pub fn new(
        search_engine: Arc<dyn SearchEngine>,
        scraper: Arc<dyn ScraperEngine>,
        settings: ScraperSettings,
        max_search_results: u32,
    ) -> Self {
        Self {
            search_engine,
            scraper,
            settings,
            max_search_results,
        }
    }

    /// 搜索并抓取，返回按搜索顺序排列、最多 `target_results` 条的结果
    pub async fn search_and_scrape(
        &self,
        niche: &str,
        location: &str,
    ) -> Result<Vec<ScrapeResult>, LeadServiceError> {
        let query = build_dork(niche, location);
        info!(query = %query, engine = self.search_engine.name(), "Searching");

        let urls: Vec<String> = self
            .search_engine
            .search(&query, self.max_search_results)
            .await?
            .into_iter()
            .map(|r| r.url)
            .take(self.max_search_results as usize)
            .collect();
        info!("Found {} URLs", urls.len());
        metrics::counter!("leadrs_searches_total").increment(1);

        let target = self.settings.target_results;
        let mut results = Vec::with_capacity(target.min(urls.len()));

        for url in urls {
            if results.len() >= target {
                break;
            }
            if !site_filter::is_eligible(&url) {
                debug!(url = %url, "Skipping social media site");
                continue;
            }

            info!(url = %url, "Scraping (result {}/{})", results.len() + 1, target);
            results.push(self.scrape_url(&url).await);
        }

        info!("Collected {} results", results.len());
        results.truncate(target);
        Ok(results)
    }

    /// 抓取单个页面；任何抓取失败都转换为带错误信息的空结果
    pub async fn scrape_url(&self, url: &str) -> ScrapeResult {
        let request = ScrapeRequest {
            url: url.to_string(),
            user_agent: self.settings.user_agent.clone(),
            timeout: self.settings.timeout(),
        };

        let outcome = match self.scraper.scrape(&request).await {
            Ok(response) if response.is_success() => {
                debug!(url, elapsed_ms = response.response_time_ms, "Fetched page");
                ExtractionService::extract(&response.content, url)
            }
            Ok(response) => {
                warn!(url, status = response.status_code, "Error scraping");
                ScrapeResult::failed(url, format!("HTTP status {}", response.status_code))
            }
            Err(e) => {
                warn!(url, error = %e, "Error scraping");
                ScrapeResult::failed(url, e.to_string())
            }
        };

        let status = if outcome.is_error() { "error" } else { "success" };
        metrics::counter!("leadrs_pages_scraped_total", "status" => status).increment(1);
        outcome
    }
}

#[cfg(test)]
#[path = "lead_service_test.rs"]
mod lead_service_test;
