// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 配额仓库（quota_repository）：用户配额快照的整体读写
/// - 表格仓库（sheet_repository）：抓取结果导出的目标表格
pub mod quota_repository;
pub mod sheet_repository;
