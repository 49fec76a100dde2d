// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::models::plan::{PlanDefinition, PlanRegistry, DEFAULT_PLAN};

/// 用户配额记录
///
/// 每个出现过的邮箱对应一条记录，首次检查或计数时惰性创建，从不删除。
/// 序列化字段名与配额快照文件保持一致（`quota` 即缓存的配额上限）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQuotaRecord {
    /// 用户邮箱（快照中的键）
    #[serde(default)]
    pub email: String,
    /// 套餐名称
    #[serde(default = "default_plan_name")]
    pub plan: String,
    /// 当前周期已用次数
    #[serde(default)]
    pub used: u32,
    /// 缓存的配额上限，管理员修改套餐后可能与注册表不同
    #[serde(rename = "quota", default = "default_quota_limit")]
    pub quota_limit: u32,
    /// 上次重置日期。字段缺失时视为今天；无法解析时为 `None`，下次访问即重置
    #[serde(default = "missing_last_reset", deserialize_with = "lenient_date")]
    pub last_reset: Option<NaiveDate>,
    /// 创建时间
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_plan_name() -> String {
    DEFAULT_PLAN.to_string()
}

fn default_quota_limit() -> u32 {
    PlanRegistry::default_plan().quota_limit
}

fn missing_last_reset() -> Option<NaiveDate> {
    Some(Local::now().date_naive())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}

impl UserQuotaRecord {
    /// 以默认套餐创建新记录
    pub fn new(email: impl Into<String>, today: NaiveDate, now: DateTime<Utc>) -> Self {
        let plan = PlanRegistry::default_plan();
        Self {
            email: email.into(),
            plan: plan.name.to_string(),
            used: 0,
            quota_limit: plan.quota_limit,
            last_reset: Some(today),
            created_at: Some(now),
        }
    }

    /// 记录对应的套餐定义（未知套餐回退到默认套餐）
    pub fn plan_definition(&self) -> &'static PlanDefinition {
        PlanRegistry::lookup(&self.plan)
    }

    pub fn is_reset_due(&self, today: NaiveDate) -> bool {
        self.plan_definition()
            .period
            .is_reset_due(self.last_reset, today)
    }

    /// 开始新周期：清零用量并刷新配额上限
    pub fn reset(&mut self, today: NaiveDate) {
        self.used = 0;
        self.last_reset = Some(today);
        self.quota_limit = self.plan_definition().quota_limit;
    }

    /// 切换套餐，用量同时清零
    pub fn change_plan(&mut self, plan: &PlanDefinition, today: NaiveDate) {
        self.plan = plan.name.to_string();
        self.quota_limit = plan.quota_limit;
        self.used = 0;
        self.last_reset = Some(today);
    }

    pub fn can_search(&self) -> bool {
        self.used < self.quota_limit
    }

    pub fn remaining(&self) -> u32 {
        self.quota_limit.saturating_sub(self.used)
    }
}

/// 配额检查结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub plan: String,
    pub used: u32,
    pub quota_limit: u32,
    pub remaining: u32,
    pub message: String,
}

impl QuotaDecision {
    pub fn from_record(record: &UserQuotaRecord) -> Self {
        let allowed = record.can_search();
        let message = if allowed {
            format!(
                "Search allowed. {} searches remaining on {} plan",
                record.remaining(),
                record.plan
            )
        } else {
            format!(
                "Quota exceeded. Please upgrade your plan. Current plan: {} ({}/{} searches used)",
                record.plan, record.used, record.quota_limit
            )
        };

        Self {
            allowed,
            plan: record.plan.clone(),
            used: record.used,
            quota_limit: record.quota_limit,
            remaining: record.remaining(),
            message,
        }
    }
}

/// 用户配额状态视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuotaStatus {
    pub email: String,
    pub plan: String,
    pub used: u32,
    pub quota: u32,
    pub remaining: u32,
    pub last_reset: String,
}

impl UserQuotaStatus {
    pub fn from_record(record: Option<&UserQuotaRecord>, email: &str) -> Self {
        match record {
            Some(record) => Self {
                email: email.to_string(),
                plan: record.plan.clone(),
                used: record.used,
                quota: record.quota_limit,
                remaining: record.remaining(),
                last_reset: record
                    .last_reset
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "Never".to_string()),
            },
            None => {
                let plan = PlanRegistry::default_plan();
                Self {
                    email: email.to_string(),
                    plan: plan.name.to_string(),
                    used: 0,
                    quota: plan.quota_limit,
                    remaining: plan.quota_limit,
                    last_reset: "Never".to_string(),
                }
            }
        }
    }
}
