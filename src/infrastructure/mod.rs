// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 指标（metrics）：Prometheus 导出器
/// - 仓库实现（repositories）：配额快照的 JSON 文件存储
/// - 搜索（search）：Serper 搜索接口客户端
/// - 表格（sheets）：本地工作簿与 Google Sheets 导出
///
/// 基础设施层依赖于领域层的抽象接口，领域层不感知具体实现。
pub mod metrics;
pub mod repositories;
pub mod search;
pub mod sheets;
