// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 套餐（plan）：固定的套餐目录及其配额周期
/// - 用户配额（user_quota）：每个用户的用量记录与检查结果
/// - 抓取结果（scrape_result）：单个页面提取出的联系信息
/// - 搜索结果（search_result）：搜索服务返回的候选页面
pub mod plan;
pub mod scrape_result;
pub mod search_result;
pub mod user_quota;
