// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use leadrs::config::settings::ScraperSettings;
use leadrs::domain::repositories::sheet_repository::{
    Row, SheetError, SpreadsheetHandle, SpreadsheetRepository, WorksheetRef,
};
use leadrs::domain::services::{
    lead_service::LeadService, quota_service::QuotaService, report_service::ReportService,
};
use leadrs::engines::reqwest_engine::ReqwestEngine;
use leadrs::infrastructure::repositories::json_quota_repo_impl::JsonFileQuotaRepository;
use leadrs::infrastructure::search::serper::SerperSearchEngine;
use leadrs::infrastructure::sheets::local_workbook::LocalWorkbookRepository;
use leadrs::presentation::routes::{self, AppServices};
use leadrs::utils::retry_policy::RetryPolicy;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SPREADSHEET_NAME: &str = "Web Scraper Results";

/// 测试中单个页面的抓取超时（秒）
pub const SCRAPER_TIMEOUT_SECS: u64 = 2;

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    /// 模拟的 Serper 接口
    pub search: MockServer,
    /// 模拟的目标站点
    pub sites: MockServer,
    pub dir: TempDir,
}

impl TestApp {
    pub fn users_file(&self) -> PathBuf {
        self.dir.path().join("users.json")
    }

    pub fn workbook_dir(&self) -> PathBuf {
        self.dir.path().join("sheets").join(SPREADSHEET_NAME)
    }

    pub fn site_url(&self, page: &str) -> String {
        format!("{}/{}", self.sites.uri(), page)
    }

    /// 让搜索接口返回给定链接
    pub async fn mock_search_links(&self, links: &[String]) {
        let organic: Vec<_> = links
            .iter()
            .map(|link| json!({ "title": link, "link": link }))
            .collect();
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "organic": organic })))
            .mount(&self.search)
            .await;
    }

    pub async fn mock_page(&self, page: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", page)))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string(body),
            )
            .mount(&self.sites)
            .await;
    }

    /// 响应时间超过抓取超时的页面
    pub async fn mock_slow_page(&self, page: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", page)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<p>late@slowsite.in</p>")
                    .set_delay(Duration::from_secs(SCRAPER_TIMEOUT_SECS + 3)),
            )
            .mount(&self.sites)
            .await;
    }

    /// 工作簿中除默认工作表以外的 CSV 文件内容
    pub fn exported_worksheets(&self) -> Vec<(String, String)> {
        let mut sheets: Vec<(String, String)> = std::fs::read_dir(self.workbook_dir())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.path())
                    .filter(|p| p.file_name().is_some_and(|n| n != "Sheet1.csv"))
                    .map(|p| {
                        let name = p.file_stem().unwrap().to_string_lossy().into_owned();
                        (name, std::fs::read_to_string(&p).unwrap())
                    })
                    .collect()
            })
            .unwrap_or_default();
        sheets.sort();
        sheets
    }
}

/// 写入结果时总是失败的表格后端
pub struct FailingSheets;

#[async_trait]
impl SpreadsheetRepository for FailingSheets {
    async fn open_or_create(&self) -> Result<SpreadsheetHandle, SheetError> {
        Ok(SpreadsheetHandle {
            id: "broken".to_string(),
            url: "https://sheets.example/broken".to_string(),
            created: false,
        })
    }

    async fn ensure_public_access(&self, _sheet: &SpreadsheetHandle) -> Result<(), SheetError> {
        Ok(())
    }

    async fn add_worksheet(
        &self,
        _sheet: &SpreadsheetHandle,
        title: &str,
        _rows: usize,
        _cols: usize,
    ) -> Result<WorksheetRef, SheetError> {
        Ok(WorksheetRef {
            title: title.to_string(),
        })
    }

    async fn default_worksheet(
        &self,
        _sheet: &SpreadsheetHandle,
    ) -> Result<WorksheetRef, SheetError> {
        Ok(WorksheetRef {
            title: "Sheet1".to_string(),
        })
    }

    async fn clear_worksheet(
        &self,
        _sheet: &SpreadsheetHandle,
        _worksheet: &WorksheetRef,
    ) -> Result<(), SheetError> {
        Ok(())
    }

    async fn append_rows(
        &self,
        _sheet: &SpreadsheetHandle,
        _worksheet: &WorksheetRef,
        _rows: &[Row],
    ) -> Result<(), SheetError> {
        Err(SheetError::Api {
            status: 503,
            message: "The service is currently unavailable.".to_string(),
        })
    }

    async fn format_worksheet(
        &self,
        _sheet: &SpreadsheetHandle,
        _worksheet: &WorksheetRef,
        _header_columns: usize,
        _summary_row: usize,
    ) -> Result<(), SheetError> {
        Ok(())
    }
}

pub async fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let sheets = Arc::new(LocalWorkbookRepository::new(
        dir.path().join("sheets"),
        SPREADSHEET_NAME,
    ));
    create_test_app_with_sheets(dir, sheets).await
}

/// 使用给定的表格后端创建测试应用
pub async fn create_test_app_with_sheets(
    dir: TempDir,
    sheets: Arc<dyn SpreadsheetRepository>,
) -> TestApp {
    let search = MockServer::start().await;
    let sites = MockServer::start().await;

    let search_engine = Arc::new(SerperSearchEngine::new(
        format!("{}/search", search.uri()),
        Some("test-key".to_string()),
    ));
    let scraper_settings = ScraperSettings {
        timeout_secs: SCRAPER_TIMEOUT_SECS,
        ..ScraperSettings::default()
    };
    let quota_repo = Arc::new(JsonFileQuotaRepository::new(dir.path().join("users.json")));
    let share_policy = RetryPolicy {
        initial_backoff: Duration::from_millis(1),
        enable_jitter: false,
        ..RetryPolicy::standard()
    };

    let services = AppServices {
        leads: Arc::new(LeadService::new(
            search_engine,
            Arc::new(ReqwestEngine::new()),
            scraper_settings,
            50,
        )),
        quota: Arc::new(QuotaService::new(quota_repo)),
        reports: Arc::new(ReportService::new(sheets, share_policy)),
    };

    let server = TestServer::new(routes::app(services)).unwrap();

    TestApp {
        server,
        search,
        sites,
        dir,
    }
}
