// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// 默认套餐名称，未知套餐都回退到它
pub const DEFAULT_PLAN: &str = "Free Trial";

/// 配额重置周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaPeriod {
    Daily,
    Monthly,
}

impl QuotaPeriod {
    /// 判断从 `last_reset` 到 `today` 是否已进入新的周期
    ///
    /// 只比较日历日期：每日周期要求日期相同，每月周期只比较年和月。
    /// `last_reset` 为 `None`（存储的日期无法解析）时总是需要重置。
    pub fn is_reset_due(self, last_reset: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self, last_reset) {
            (_, None) => true,
            (QuotaPeriod::Daily, Some(last)) => last != today,
            (QuotaPeriod::Monthly, Some(last)) => {
                last.year() != today.year() || last.month() != today.month()
            }
        }
    }
}

/// 套餐定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanDefinition {
    pub name: &'static str,
    pub quota_limit: u32,
    pub period: QuotaPeriod,
}

static PLANS: [PlanDefinition; 5] = [
    PlanDefinition {
        name: "Free Trial",
        quota_limit: 5,
        period: QuotaPeriod::Daily,
    },
    PlanDefinition {
        name: "Starter",
        quota_limit: 30,
        period: QuotaPeriod::Monthly,
    },
    PlanDefinition {
        name: "Pro",
        quota_limit: 100,
        period: QuotaPeriod::Monthly,
    },
    PlanDefinition {
        name: "Agency",
        quota_limit: 300,
        period: QuotaPeriod::Monthly,
    },
    PlanDefinition {
        name: "Ultimate",
        quota_limit: 100,
        period: QuotaPeriod::Daily,
    },
];

/// 套餐注册表
///
/// 进程内固定的套餐目录
pub struct PlanRegistry;

impl PlanRegistry {
    /// 按名称查找套餐，未知名称回退到 "Free Trial"
    pub fn lookup(name: &str) -> &'static PlanDefinition {
        Self::get(name).unwrap_or(&PLANS[0])
    }

    /// 按名称精确查找套餐
    pub fn get(name: &str) -> Option<&'static PlanDefinition> {
        PLANS.iter().find(|plan| plan.name == name)
    }

    pub fn default_plan() -> &'static PlanDefinition {
        &PLANS[0]
    }

    pub fn all() -> &'static [PlanDefinition] {
        &PLANS
    }
}
