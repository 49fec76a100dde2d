// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use leadrs::config::settings::Settings;
use leadrs::domain::repositories::sheet_repository::SpreadsheetRepository;
use leadrs::domain::services::{
    lead_service::LeadService, quota_service::QuotaService, report_service::ReportService,
};
use leadrs::engines::reqwest_engine::ReqwestEngine;
use leadrs::infrastructure::repositories::json_quota_repo_impl::JsonFileQuotaRepository;
use leadrs::infrastructure::search::serper::SerperSearchEngine;
use leadrs::infrastructure::sheets::{
    google_sheets::GoogleSheetsRepository, local_workbook::LocalWorkbookRepository,
};
use leadrs::presentation::routes::{self, AppServices};
use leadrs::utils::retry_policy::RetryPolicy;
use leadrs::utils::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }
    telemetry::init_telemetry();
    info!("Starting leadrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    leadrs::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Repositories
    let quota_repo = Arc::new(JsonFileQuotaRepository::new(&settings.quota.users_file));
    info!(path = %quota_repo.path().display(), "Quota store ready");

    let sheets: Arc<dyn SpreadsheetRepository> = match settings.sheets.backend.as_str() {
        "google" => Arc::new(GoogleSheetsRepository::from_settings(&settings.sheets).await?),
        other => {
            if other != "local" {
                warn!("Unknown sheets backend '{}', using local workbook", other);
            }
            Arc::new(LocalWorkbookRepository::new(
                &settings.sheets.local_path,
                &settings.sheets.spreadsheet_name,
            ))
        }
    };

    // 4. Services
    let search = Arc::new(SerperSearchEngine::from_settings(&settings.search));
    let scraper = Arc::new(ReqwestEngine::new());
    let services = AppServices {
        leads: Arc::new(LeadService::new(
            search,
            scraper,
            settings.scraper.clone(),
            settings.search.max_results,
        )),
        quota: Arc::new(QuotaService::new(quota_repo)),
        reports: Arc::new(ReportService::new(
            sheets,
            RetryPolicy::standard().with_max_retries(settings.sheets.share_retries),
        )),
    };

    // 5. Start HTTP server
    let app = routes::app(services);
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
