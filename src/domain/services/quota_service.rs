// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Local, NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::models::plan::{PlanRegistry, DEFAULT_PLAN};
use crate::domain::models::user_quota::{QuotaDecision, UserQuotaRecord, UserQuotaStatus};
use crate::domain::repositories::quota_repository::{QuotaRepository, QuotaRepositoryError};

#[derive(Error, Debug)]
pub enum QuotaError {
    #[error("Quota storage error: {0}")]
    Repository(#[from] QuotaRepositoryError),
}

/// 配额服务
///
/// 负责套餐配额的周期重置、检查、计数和套餐变更。每次读-改-写都在
/// 同一把写锁内完成，进程内的并发请求不会互相覆盖更新。
pub struct QuotaService {
    repo: Arc<dyn QuotaRepository>,
    write_lock: Mutex<()>,
}

impl QuotaService {
    pub fn new(repo: Arc<dyn QuotaRepository>) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// 当前日历日期（本地时区）
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// 检查用户能否再执行一次搜索
    pub async fn check_quota(&self, email: &str) -> Result<QuotaDecision, QuotaError> {
        self.check_quota_on(email, Self::today()).await
    }

    pub async fn check_quota_on(
        &self,
        email: &str,
        today: NaiveDate,
    ) -> Result<QuotaDecision, QuotaError> {
        let decision = self
            .with_current_record(email, today, |record| (QuotaDecision::from_record(record), false))
            .await?;

        if decision.allowed {
            debug!(email, remaining = decision.remaining, "Quota check passed");
        } else {
            info!(email, plan = %decision.plan, used = decision.used, "Quota exceeded");
            metrics::counter!("leadrs_quota_denied_total").increment(1);
        }
        Ok(decision)
    }

    /// 用量加一
    ///
    /// 不检查上限，调用方必须先通过 [`check_quota`](Self::check_quota)。
    pub async fn increment_usage(&self, email: &str) -> Result<u32, QuotaError> {
        self.increment_usage_on(email, Self::today()).await
    }

    pub async fn increment_usage_on(&self, email: &str, today: NaiveDate) -> Result<u32, QuotaError> {
        let used = self
            .with_current_record(email, today, |record| {
                record.used = record.used.saturating_add(1);
                (record.used, true)
            })
            .await?;
        debug!(email, used, "Usage incremented");
        Ok(used)
    }

    /// 仅在周期到期时重置用量，返回重置后的记录
    pub async fn reset_if_needed(&self, email: &str) -> Result<UserQuotaRecord, QuotaError> {
        self.reset_if_needed_on(email, Self::today()).await
    }

    pub async fn reset_if_needed_on(
        &self,
        email: &str,
        today: NaiveDate,
    ) -> Result<UserQuotaRecord, QuotaError> {
        self.with_current_record(email, today, |record| (record.clone(), false))
            .await
    }

    /// 变更用户套餐
    ///
    /// 套餐名不在注册表中时返回 `Ok(false)` 且不修改任何数据
    pub async fn update_user_plan(&self, email: &str, plan_name: &str) -> Result<bool, QuotaError> {
        self.update_user_plan_on(email, plan_name, Self::today()).await
    }

    pub async fn update_user_plan_on(
        &self,
        email: &str,
        plan_name: &str,
        today: NaiveDate,
    ) -> Result<bool, QuotaError> {
        let Some(plan) = PlanRegistry::get(plan_name) else {
            return Ok(false);
        };

        let _guard = self.write_lock.lock().await;
        let mut users = self.repo.load().await?;
        let record = users
            .entry(email.to_string())
            .or_insert_with(|| UserQuotaRecord::new(email, today, Utc::now()));
        record.change_plan(plan, today);
        self.repo.save(&users).await?;

        info!(email, plan = plan.name, "User plan updated");
        Ok(true)
    }

    /// 用户当前套餐名，未知用户为默认套餐
    pub async fn get_user_plan(&self, email: &str) -> Result<String, QuotaError> {
        let users = self.repo.load().await?;
        Ok(users
            .get(email)
            .map(|record| record.plan.clone())
            .unwrap_or_else(|| DEFAULT_PLAN.to_string()))
    }

    /// 用户配额状态，不会创建记录也不会触发重置
    pub async fn get_user_status(&self, email: &str) -> Result<UserQuotaStatus, QuotaError> {
        let users = self.repo.load().await?;
        Ok(UserQuotaStatus::from_record(users.get(email), email))
    }

    /// 在写锁内取出（必要时创建并重置）用户记录，交给 `apply` 处理
    ///
    /// `apply` 返回的布尔值表示记录是否被修改；创建或重置本身也会触发保存。
    async fn with_current_record<T, F>(
        &self,
        email: &str,
        today: NaiveDate,
        apply: F,
    ) -> Result<T, QuotaError>
    where
        F: FnOnce(&mut UserQuotaRecord) -> (T, bool),
    {
        let _guard = self.write_lock.lock().await;
        let mut users = self.repo.load().await?;
        let mut dirty = false;

        let record = users.entry(email.to_string()).or_insert_with(|| {
            info!(email, "Creating quota record with default plan");
            dirty = true;
            UserQuotaRecord::new(email, today, Utc::now())
        });
        if record.email.is_empty() {
            record.email = email.to_string();
        }

        if record.is_reset_due(today) {
            debug!(email, plan = %record.plan, "Quota period elapsed, resetting usage");
            record.reset(today);
            dirty = true;
        }

        let (value, changed) = apply(record);
        if dirty || changed {
            self.repo.save(&users).await?;
        }
        Ok(value)
    }
}

#[cfg(test)]
#[path = "quota_service_test.rs"]
mod quota_service_test;
