// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 线索抓取请求数据传输对象
///
/// `niche` 和 `location` 必须存在且非空；`email` 存在时启用配额检查
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ScrapeRequestDto {
    /// 行业关键词
    #[validate(required, length(min = 1))]
    pub niche: Option<String>,
    /// 地点
    #[validate(required, length(min = 1))]
    pub location: Option<String>,
    /// 用户邮箱
    #[serde(default)]
    pub email: Option<String>,
}

impl ScrapeRequestDto {
    /// 校验通过后返回 (niche, location)
    pub fn target(&self) -> Option<(&str, &str)> {
        if self.validate().is_err() {
            return None;
        }
        Some((self.niche.as_deref()?, self.location.as_deref()?))
    }

    /// 非空邮箱
    pub fn user_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}
