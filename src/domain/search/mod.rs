// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索领域模块
///
/// 定义搜索引擎接口和搜索指令的构造规则
pub mod engine;
pub mod query;
