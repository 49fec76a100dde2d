// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// 表格操作错误类型
#[derive(Error, Debug)]
pub enum SheetError {
    /// 同名工作表已存在
    #[error("Worksheet already exists: {0}")]
    AlreadyExists(String),
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 服务端返回错误
    #[error("Spreadsheet API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 配置缺失
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    /// 获取访问令牌失败
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// 单元格值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(u64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Number(value as u64)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(text) => write!(f, "{}", text),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// 一行单元格
pub type Row = Vec<CellValue>;

/// 已打开的表格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetHandle {
    /// 表格标识
    pub id: String,
    /// 调用方可访问的地址
    pub url: String,
    /// 是否为本次新建
    pub created: bool,
}

/// 工作表引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetRef {
    pub title: String,
}

/// 表格仓库特质
///
/// 定义导出结果所需的表格访问接口
#[async_trait]
pub trait SpreadsheetRepository: Send + Sync {
    /// 打开配置的表格，不存在时新建
    async fn open_or_create(&self) -> Result<SpreadsheetHandle, SheetError>;

    /// 确保任何持有链接的人都可以访问表格，可重复调用
    async fn ensure_public_access(&self, sheet: &SpreadsheetHandle) -> Result<(), SheetError>;

    /// 新建工作表，同名时返回 `SheetError::AlreadyExists`
    async fn add_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> Result<WorksheetRef, SheetError>;

    /// 表格的默认（第一个）工作表
    async fn default_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
    ) -> Result<WorksheetRef, SheetError>;

    /// 清空工作表内容
    async fn clear_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
    ) -> Result<(), SheetError>;

    /// 在工作表末尾追加若干行
    async fn append_rows(
        &self,
        sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
        rows: &[Row],
    ) -> Result<(), SheetError>;

    /// 美化已写入的工作表：表头行 `A1` 起 `header_columns` 列、
    /// 第 `summary_row` 行（从 1 开始）的汇总标题，并自动调整列宽
    async fn format_worksheet(
        &self,
        sheet: &SpreadsheetHandle,
        worksheet: &WorksheetRef,
        header_columns: usize,
        summary_row: usize,
    ) -> Result<(), SheetError>;
}
