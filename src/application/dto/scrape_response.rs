// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 抓取成功响应
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScrapeResponseDto {
    /// 固定为 "success"
    pub status: String,
    /// 导出表格地址
    pub sheet_url: String,
    /// 结果条数
    pub results_count: usize,
    /// 表格需要手动共享
    pub manual_share_required: bool,
}

impl ScrapeResponseDto {
    pub fn success(sheet_url: String, results_count: usize, manual_share_required: bool) -> Self {
        Self {
            status: "success".to_string(),
            sheet_url,
            results_count,
            manual_share_required,
        }
    }
}
