// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::domain::repositories::quota_repository::{
    QuotaRepository, QuotaRepositoryError, QuotaSnapshot,
};

/// 基于 JSON 文件的配额仓库实现
///
/// 整个快照保存在一个 JSON 对象中（邮箱 -> 记录）。写入时先写临时文件再
/// 重命名覆盖，避免读到写了一半的文件。
pub struct JsonFileQuotaRepository {
    path: PathBuf,
}

impl JsonFileQuotaRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "users.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl QuotaRepository for JsonFileQuotaRepository {
    async fn load(&self) -> Result<QuotaSnapshot, QuotaRepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Quota file not found, starting empty");
                return Ok(QuotaSnapshot::new());
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Error loading users, starting empty");
                return Ok(QuotaSnapshot::new());
            }
        };

        if content.trim().is_empty() {
            return Ok(QuotaSnapshot::new());
        }

        match serde_json::from_str::<QuotaSnapshot>(&content) {
            Ok(mut snapshot) => {
                // The key is authoritative for the email
                for (email, record) in snapshot.iter_mut() {
                    if record.email != *email {
                        record.email = email.clone();
                    }
                }
                Ok(snapshot)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Error loading users, starting empty");
                Ok(QuotaSnapshot::new())
            }
        }
    }

    async fn save(&self, snapshot: &QuotaSnapshot) -> Result<(), QuotaRepositoryError> {
        let json = serde_json::to_string_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}
