// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::models::scrape_result::ScrapeResult;
use crate::domain::repositories::sheet_repository::{
    CellValue, Row, SheetError, SpreadsheetHandle, SpreadsheetRepository, WorksheetRef,
};
use crate::domain::search::query::display_query;
use crate::utils::retry_policy::RetryPolicy;
use crate::utils::url_utils::title_from_url;

/// 导出表头
pub const HEADERS: [&str; 8] = [
    "URL",
    "Title",
    "Emails",
    "Phone Numbers",
    "Facebook Profiles",
    "Instagram Profiles",
    "Scraped At",
    "Status",
];

/// 新建工作表时在结果行数之外预留的行数
const EXTRA_ROWS: usize = 20;
const WORKSHEET_COLS: usize = 10;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),
}

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetExport {
    /// 表格地址
    pub url: String,
    /// 自动共享失败，需要手动开放访问
    pub manual_share_required: bool,
}

/// 报表服务
///
/// 把一次搜索的抓取结果写成一个新的工作表，并在末尾附加汇总区块
pub struct ReportService {
    sheets: Arc<dyn SpreadsheetRepository>,
    share_policy: RetryPolicy,
}

impl ReportService {
    pub fn new(sheets: Arc<dyn SpreadsheetRepository>, share_policy: RetryPolicy) -> Self {
        Self {
            sheets,
            share_policy,
        }
    }

    pub async fn save_to_sheet(
        &self,
        results: &[ScrapeResult],
        niche: &str,
        location: &str,
    ) -> Result<SheetExport, ReportError> {
        self.save_to_sheet_at(results, niche, location, Local::now())
            .await
            .inspect_err(|e| error!("Error saving to spreadsheet: {}", e))
    }

    pub async fn save_to_sheet_at(
        &self,
        results: &[ScrapeResult],
        niche: &str,
        location: &str,
        now: DateTime<Local>,
    ) -> Result<SheetExport, ReportError> {
        let sheet = self.sheets.open_or_create().await?;
        let manual_share_required = sheet.created && !self.share(&sheet).await;

        let title = format!("{}_{}_{}", niche, location, now.format("%Y%m%d_%H%M%S"));
        let worksheet = self.prepare_worksheet(&sheet, &title, results.len()).await?;

        let scraped_at = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let rows = build_rows(results, niche, location, &scraped_at);
        self.sheets.append_rows(&sheet, &worksheet, &rows).await?;

        // Header, results, blank line, then the summary title
        let summary_row = results.len() + 3;
        if let Err(e) = self
            .sheets
            .format_worksheet(&sheet, &worksheet, HEADERS.len(), summary_row)
            .await
        {
            warn!(worksheet = %worksheet.title, "Column formatting warning: {}", e);
        }

        info!(
            worksheet = %worksheet.title,
            rows = results.len(),
            "Results exported to {}",
            sheet.url
        );
        metrics::counter!("leadrs_sheet_exports_total").increment(1);

        Ok(SheetExport {
            url: sheet.url,
            manual_share_required,
        })
    }

    /// 新建工作表；失败（包括同名已存在）时回退到清空后的默认工作表
    async fn prepare_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        title: &str,
        result_count: usize,
    ) -> Result<WorksheetRef, SheetError> {
        match self
            .sheets
            .add_worksheet(sheet, title, result_count + EXTRA_ROWS, WORKSHEET_COLS)
            .await
        {
            Ok(worksheet) => Ok(worksheet),
            Err(e) => {
                warn!(worksheet = title, error = %e, "Falling back to default worksheet");
                let worksheet = self.sheets.default_worksheet(sheet).await?;
                self.sheets.clear_worksheet(sheet, &worksheet).await?;
                Ok(worksheet)
            }
        }
    }

    /// 开放访问，返回是否成功
    async fn share(&self, sheet: &SpreadsheetHandle) -> bool {
        match self
            .share_policy
            .run("Sharing spreadsheet", || self.sheets.ensure_public_access(sheet))
            .await
        {
            Ok(()) => {
                info!("Spreadsheet made publicly accessible");
                true
            }
            Err(e) => {
                warn!(
                    "All sharing attempts failed: {}. Manual sharing required: open {}, \
                     click 'Share', choose 'Anyone with the link can view' and copy the link",
                    e, sheet.url
                );
                false
            }
        }
    }
}

/// 生成表头、结果行和汇总区块
pub fn build_rows(
    results: &[ScrapeResult],
    niche: &str,
    location: &str,
    scraped_at: &str,
) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::with_capacity(results.len() + 9);
    rows.push(HEADERS.iter().map(|h| CellValue::from(*h)).collect());

    for item in results {
        rows.push(vec![
            CellValue::from(item.url.as_str()),
            CellValue::from(title_from_url(&item.url)),
            CellValue::from(join(&item.emails)),
            CellValue::from(join(&item.phones)),
            CellValue::from(join(&item.social_links.facebook)),
            CellValue::from(join(&item.social_links.instagram)),
            CellValue::from(scraped_at),
            CellValue::from(item.status_label()),
        ]);
    }

    let total_emails: usize = results.iter().map(|r| r.emails.len()).sum();
    let total_phones: usize = results.iter().map(|r| r.phones.len()).sum();
    let total_facebook: usize = results.iter().map(|r| r.social_links.facebook.len()).sum();
    let total_instagram: usize = results.iter().map(|r| r.social_links.instagram.len()).sum();

    rows.push(Vec::new());
    rows.push(vec![CellValue::from("Summary")]);
    rows.push(vec![
        CellValue::from("Search Query"),
        CellValue::from(display_query(niche, location)),
    ]);
    rows.push(vec![
        CellValue::from("Total URLs Scraped"),
        CellValue::from(results.len()),
    ]);
    rows.push(vec![
        CellValue::from("Total Emails Found"),
        CellValue::from(total_emails),
    ]);
    rows.push(vec![
        CellValue::from("Total Phone Numbers Found"),
        CellValue::from(total_phones),
    ]);
    rows.push(vec![
        CellValue::from("Total Facebook Profiles Found"),
        CellValue::from(total_facebook),
    ]);
    rows.push(vec![
        CellValue::from("Total Instagram Profiles Found"),
        CellValue::from(total_instagram),
    ]);

    rows
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "report_service_test.rs"]
mod report_service_test;
