// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::settings::SheetsSettings;
use crate::domain::repositories::sheet_repository::{
    Row, SheetError, SpreadsheetHandle, SpreadsheetRepository, WorksheetRef,
};
use crate::infrastructure::sheets::google_auth::{ServiceAccountTokens, TokenSource};

/// 未配置令牌时读取的环境变量
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const DRIVE_API_BASE: &str = "https://www.googleapis.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetMeta {
    spreadsheet_id: String,
    #[serde(default)]
    spreadsheet_url: Option<String>,
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId", default)]
    sheet_id: i64,
    title: String,
}

/// Google Sheets 实现
///
/// 通过 Sheets v4 和 Drive v3 REST 接口访问表格，使用 Bearer 令牌认证
pub struct GoogleSheetsRepository {
    client: Client,
    tokens: TokenSource,
    spreadsheet_name: String,
    sheets_base: String,
    drive_base: String,
    /// 配置的或本进程新建的表格 ID
    spreadsheet_id: RwLock<Option<String>>,
}

impl GoogleSheetsRepository {
    pub fn new(
        tokens: impl Into<TokenSource>,
        spreadsheet_id: Option<String>,
        spreadsheet_name: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            tokens: tokens.into(),
            spreadsheet_name: spreadsheet_name.into(),
            sheets_base: SHEETS_API_BASE.to_string(),
            drive_base: DRIVE_API_BASE.to_string(),
            spreadsheet_id: RwLock::new(spreadsheet_id.filter(|id| !id.trim().is_empty())),
        }
    }

    /// 从配置创建
    ///
    /// 固定令牌（`sheets.access_token` 或 `GOOGLE_ACCESS_TOKEN`）优先，
    /// 否则使用 `sheets.credentials_file` 指向的服务账号凭据
    pub async fn from_settings(settings: &SheetsSettings) -> Result<Self, SheetError> {
        let static_token = settings
            .access_token
            .clone()
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty());
        let credentials_file = settings
            .credentials_file
            .as_deref()
            .filter(|p| !p.trim().is_empty());

        let tokens = match (static_token, credentials_file) {
            (Some(token), _) => {
                info!("Using static Google access token");
                TokenSource::Static(token)
            }
            (None, Some(path)) => {
                let tokens = ServiceAccountTokens::from_file(path).await?;
                info!(account = tokens.client_email(), "Using service account credentials");
                TokenSource::ServiceAccount(tokens)
            }
            (None, None) => {
                return Err(SheetError::MissingConfig(format!(
                    "sheets.credentials_file or {}",
                    ACCESS_TOKEN_ENV
                )))
            }
        };

        Ok(Self::new(
            tokens,
            settings.spreadsheet_id.clone(),
            settings.spreadsheet_name.clone(),
        ))
    }

    /// 替换 API 地址
    pub fn with_base_urls(mut self, sheets_base: impl Into<String>, drive_base: impl Into<String>) -> Self {
        self.sheets_base = sheets_base.into();
        self.drive_base = drive_base.into();
        self
    }

    fn spreadsheet_url(&self, id: &str) -> String {
        format!("{}/v4/spreadsheets/{}", self.sheets_base, id)
    }

    fn values_url(&self, id: &str, worksheet: &str, action: &str) -> String {
        let range = format!("'{}'", worksheet.replace('\'', "''"));
        format!(
            "{}/values/{}:{}",
            self.spreadsheet_url(id),
            urlencoding::encode(&range),
            action
        )
    }

    async fn fetch_meta(&self, id: &str) -> Result<Option<SpreadsheetMeta>, SheetError> {
        let token = self.tokens.token().await?;
        let response = self
            .client
            .get(self.spreadsheet_url(id))
            .bearer_auth(token)
            .query(&[(
                "fields",
                "spreadsheetId,spreadsheetUrl,sheets.properties(sheetId,title)",
            )])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    async fn create_spreadsheet(&self) -> Result<SpreadsheetMeta, SheetError> {
        let token = self.tokens.token().await?;
        let response = self
            .client
            .post(format!("{}/v4/spreadsheets", self.sheets_base))
            .bearer_auth(token)
            .json(&json!({ "properties": { "title": self.spreadsheet_name } }))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    fn handle(&self, meta: SpreadsheetMeta, created: bool) -> SpreadsheetHandle {
        let url = meta.spreadsheet_url.unwrap_or_else(|| {
            format!(
                "https://docs.google.com/spreadsheets/d/{}",
                meta.spreadsheet_id
            )
        });
        SpreadsheetHandle {
            id: meta.spreadsheet_id,
            url,
            created,
        }
    }
}

/// 表头加粗蓝底、汇总标题加粗灰底，并按表头列数自动调整列宽
fn format_requests(sheet_id: i64, header_columns: usize, summary_row: usize) -> serde_json::Value {
    let summary_index = summary_row.saturating_sub(1);
    json!({
        "requests": [
            repeat_cell(sheet_id, 0, header_columns, json!({"red": 0.2, "green": 0.6, "blue": 0.9})),
            repeat_cell(sheet_id, summary_index, 2, json!({"red": 0.9, "green": 0.9, "blue": 0.9})),
            {
                "autoResizeDimensions": {
                    "dimensions": {
                        "sheetId": sheet_id,
                        "dimension": "COLUMNS",
                        "startIndex": 0,
                        "endIndex": header_columns
                    }
                }
            }
        ]
    })
}

/// 单行 `columns` 列加粗并设置背景色
fn repeat_cell(
    sheet_id: i64,
    row_index: usize,
    columns: usize,
    background: serde_json::Value,
) -> serde_json::Value {
    json!({
        "repeatCell": {
            "range": {
                "sheetId": sheet_id,
                "startRowIndex": row_index,
                "endRowIndex": row_index + 1,
                "startColumnIndex": 0,
                "endColumnIndex": columns
            },
            "cell": {
                "userEnteredFormat": {
                    "textFormat": { "bold": true },
                    "backgroundColor": background
                }
            },
            "fields": "userEnteredFormat(textFormat,backgroundColor)"
        }
    })
}

/// 非 2xx 响应转换为 `SheetError::Api`
async fn check(response: Response) -> Result<Response, SheetError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SheetError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SpreadsheetRepository for GoogleSheetsRepository {
    async fn open_or_create(&self) -> Result<SpreadsheetHandle, SheetError> {
        let known_id = self.spreadsheet_id.read().await.clone();
        if let Some(id) = known_id {
            if let Some(meta) = self.fetch_meta(&id).await? {
                debug!(spreadsheet = %id, "Opened existing spreadsheet");
                return Ok(self.handle(meta, false));
            }
            warn!(spreadsheet = %id, "Spreadsheet not found, creating a new one");
        }

        let meta = self.create_spreadsheet().await?;
        info!(spreadsheet = %meta.spreadsheet_id, "Created new spreadsheet");
        *self.spreadsheet_id.write().await = Some(meta.spreadsheet_id.clone());
        Ok(self.handle(meta, true))
    }

    async fn ensure_public_access(&self, sheet: &SpreadsheetHandle) -> Result<(), SheetError> {
        let token = self.tokens.token().await?;
        let response = self
            .client
            .post(format!(
                "{}/drive/v3/files/{}/permissions",
                self.drive_base, sheet.id
            ))
            .bearer_auth(token)
            .json(&json!({ "type": "anyone", "role": "writer" }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn add_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> Result<WorksheetRef, SheetError> {
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]
        });
        let token = self.tokens.token().await?;
        let response = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url(&sheet.id)))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        match check(response).await {
            Ok(_) => Ok(WorksheetRef {
                title: title.to_string(),
            }),
            Err(SheetError::Api { message, .. }) if message.contains("already exists") => {
                Err(SheetError::AlreadyExists(title.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn default_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
    ) -> Result<WorksheetRef, SheetError> {
        let meta = self.fetch_meta(&sheet.id).await?.ok_or_else(|| SheetError::Api {
            status: 404,
            message: format!("Spreadsheet {} not found", sheet.id),
        })?;
        let title = meta
            .sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| SheetError::Api {
                status: 404,
                message: "Spreadsheet has no worksheets".to_string(),
            })?;
        Ok(WorksheetRef { title })
    }

    async fn clear_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
    ) -> Result<(), SheetError> {
        let token = self.tokens.token().await?;
        let response = self
            .client
            .post(self.values_url(&sheet.id, &worksheet.title, "clear"))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn append_rows(
        &self,
        sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
        rows: &[Row],
    ) -> Result<(), SheetError> {
        let token = self.tokens.token().await?;
        let response = self
            .client
            .post(self.values_url(&sheet.id, &worksheet.title, "append"))
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn format_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
        header_columns: usize,
        summary_row: usize,
    ) -> Result<(), SheetError> {
        let meta = self.fetch_meta(&sheet.id).await?.ok_or_else(|| SheetError::Api {
            status: 404,
            message: format!("Spreadsheet {} not found", sheet.id),
        })?;
        let sheet_id = meta
            .sheets
            .iter()
            .find(|s| s.properties.title == worksheet.title)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| SheetError::Api {
                status: 404,
                message: format!("Worksheet {} not found", worksheet.title),
            })?;

        let token = self.tokens.token().await?;
        let response = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url(&sheet.id)))
            .bearer_auth(token)
            .json(&format_requests(sheet_id, header_columns, summary_row))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
