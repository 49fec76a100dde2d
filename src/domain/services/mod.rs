// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 提取服务（extraction_service）：从页面标记中提取邮箱、电话和社交链接
/// - 线索服务（lead_service）：搜索候选站点并顺序抓取
/// - 配额服务（quota_service）：按套餐限制每个用户的搜索次数
/// - 报表服务（report_service）：把抓取结果导出到表格
/// - 站点过滤（site_filter）：排除社交平台与目录站点
pub mod extraction_service;
pub mod lead_service;
pub mod quota_service;
pub mod report_service;
pub mod site_filter;
