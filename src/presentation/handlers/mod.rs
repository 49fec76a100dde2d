// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// - 抓取处理器（scrape_handler）：线索搜索、抓取与导出
/// - 配额处理器（quota_handler）：配额检查、状态查询与套餐变更
pub mod quota_handler;
pub mod scrape_handler;
