// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::user_quota::QuotaDecision;

/// 套餐变更请求
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct UpdatePlanRequestDto {
    /// 新套餐名称
    #[validate(length(min = 1))]
    pub plan: String,
}

/// 配额检查响应
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct QuotaCheckResponseDto {
    pub email: String,
    pub plan: String,
    pub can_search: bool,
    pub message: String,
}

impl QuotaCheckResponseDto {
    pub fn from_decision(email: &str, decision: QuotaDecision) -> Self {
        Self {
            email: email.to_string(),
            plan: decision.plan,
            can_search: decision.allowed,
            message: decision.message,
        }
    }
}
