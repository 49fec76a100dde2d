// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 表格导出实现
///
/// - 本地工作簿（local_workbook）：目录 + CSV 文件
/// - Google Sheets（google_sheets）：Sheets v4 / Drive v3 REST 接口，
///   令牌来自 google_auth
pub mod google_auth;
pub mod google_sheets;
pub mod local_workbook;
