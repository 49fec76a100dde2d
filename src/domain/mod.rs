// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：配额记录、套餐和抓取结果
/// - 仓库接口（repositories）：配额与表格的持久化抽象接口
/// - 搜索（search）：搜索引擎特质与查询构造
/// - 服务（services）：提取、抓取编排、配额和导出
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod search;
pub mod services;
