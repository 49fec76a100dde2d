// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::domain::repositories::sheet_repository::{
    Row, SheetError, SpreadsheetHandle, SpreadsheetRepository, WorksheetRef,
};

/// 默认工作表名称
pub const DEFAULT_WORKSHEET: &str = "Sheet1";

/// 本地工作簿实现
///
/// 每个表格是 `root` 下的一个目录，每个工作表是其中的一个 CSV 文件。
/// 适合开发环境和没有 Google 凭据的部署。
pub struct LocalWorkbookRepository {
    root: PathBuf,
    spreadsheet_name: String,
}

impl LocalWorkbookRepository {
    pub fn new(root: impl Into<PathBuf>, spreadsheet_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            spreadsheet_name: spreadsheet_name.into(),
        }
    }

    fn workbook_dir(&self) -> PathBuf {
        self.root.join(sanitize_file_name(&self.spreadsheet_name))
    }

    fn worksheet_path(&self, sheet: &SpreadsheetHandle, title: &str) -> PathBuf {
        self.root
            .join(&sheet.id)
            .join(format!("{}.csv", sanitize_file_name(title)))
    }
}

#[async_trait]
impl SpreadsheetRepository for LocalWorkbookRepository {
    async fn open_or_create(&self) -> Result<SpreadsheetHandle, SheetError> {
        let dir = self.workbook_dir();
        let created = !tokio::fs::try_exists(&dir).await?;
        if created {
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::File::create(dir.join(format!("{}.csv", DEFAULT_WORKSHEET))).await?;
            info!(path = %dir.display(), "Created new workbook");
        }

        let id = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| sanitize_file_name(&self.spreadsheet_name));

        Ok(SpreadsheetHandle {
            id,
            url: file_url(&dir).await,
            created,
        })
    }

    async fn ensure_public_access(&self, sheet: &SpreadsheetHandle) -> Result<(), SheetError> {
        // Local files are readable by whoever can reach the directory
        debug!(sheet = %sheet.id, "Public access is a no-op for local workbooks");
        Ok(())
    }

    async fn add_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        title: &str,
        _rows: usize,
        _cols: usize,
    ) -> Result<WorksheetRef, SheetError> {
        let path = self.worksheet_path(sheet, title);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(_) => Ok(WorksheetRef {
                title: title.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(SheetError::AlreadyExists(title.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn default_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
    ) -> Result<WorksheetRef, SheetError> {
        let path = self.worksheet_path(sheet, DEFAULT_WORKSHEET);
        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::File::create(&path).await?;
        }
        Ok(WorksheetRef {
            title: DEFAULT_WORKSHEET.to_string(),
        })
    }

    async fn clear_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
    ) -> Result<(), SheetError> {
        tokio::fs::File::create(self.worksheet_path(sheet, &worksheet.title)).await?;
        Ok(())
    }

    async fn append_rows(
        &self,
        sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
        rows: &[Row],
    ) -> Result<(), SheetError> {
        let mut buf = String::new();
        for row in rows {
            write_csv_row(&mut buf, row);
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.worksheet_path(sheet, &worksheet.title))
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn format_worksheet(
        &self,
        _sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
        _header_columns: usize,
        _summary_row: usize,
    ) -> Result<(), SheetError> {
        // CSV has no styling
        debug!(worksheet = %worksheet.title, "Formatting is a no-op for local workbooks");
        Ok(())
    }
}

async fn file_url(dir: &Path) -> String {
    let absolute = tokio::fs::canonicalize(dir)
        .await
        .unwrap_or_else(|_| dir.to_path_buf());
    Url::from_directory_path(&absolute)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("file://{}", absolute.display()))
}

/// 文件名中不允许出现的字符替换为 `_`
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// 以 CSV 格式追加一行，行尾为 `\n`
fn write_csv_row(buf: &mut String, row: &Row) {
    let mut first = true;
    for cell in row {
        if !first {
            buf.push(',');
        }
        first = false;
        let text = cell.to_string();
        if needs_quotes(&text) {
            buf.push('"');
            buf.push_str(&text.replace('"', "\"\""));
            buf.push('"');
        } else {
            buf.push_str(&text);
        }
    }
    buf.push('\n');
}
