// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// - 重试策略（retry_policy）：指数退避加抖动
/// - 日志初始化（telemetry）
/// - URL 工具（url_utils）：从 URL 生成站点标题
pub mod retry_policy;
pub mod telemetry;
pub mod url_utils;
