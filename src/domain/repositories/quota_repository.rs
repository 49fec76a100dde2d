// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::models::user_quota::UserQuotaRecord;

/// 配额快照：邮箱 -> 配额记录
pub type QuotaSnapshot = BTreeMap<String, UserQuotaRecord>;

#[derive(Error, Debug)]
pub enum QuotaRepositoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 配额存储仓库
///
/// 以整体快照的方式读写全部用户记录
#[async_trait]
pub trait QuotaRepository: Send + Sync {
    /// 读取完整快照。缺失或损坏的数据视为空快照
    async fn load(&self) -> Result<QuotaSnapshot, QuotaRepositoryError>;

    /// 用给定快照整体替换已持久化的数据
    async fn save(&self, snapshot: &QuotaSnapshot) -> Result<(), QuotaRepositoryError>;
}
