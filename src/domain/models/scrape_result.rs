// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 社交主页链接，按平台分桶
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub facebook: BTreeSet<String>,
    pub instagram: BTreeSet<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.facebook.is_empty() && self.instagram.is_empty()
    }
}

/// 单个页面的联系信息抓取结果
///
/// 每个被抓取的 URL 生成一条，创建后不再修改。抓取失败时 `error`
/// 有值且其余字段全部为空，但结果仍计入聚合序列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// 来源 URL
    pub url: String,
    /// 邮箱地址
    pub emails: BTreeSet<String>,
    /// 电话号码
    pub phones: BTreeSet<String>,
    /// 社交主页链接
    pub social_links: SocialLinks,
    /// 抓取错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResult {
    /// 创建抓取失败的占位结果
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            emails: BTreeSet::new(),
            phones: BTreeSet::new(),
            social_links: SocialLinks::default(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// 导出时使用的状态文本
    pub fn status_label(&self) -> &'static str {
        if self.is_error() {
            "Error"
        } else {
            "Success"
        }
    }
}
