// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::repositories::quota_repository::QuotaSnapshot;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory snapshot store that counts saves
#[derive(Default)]
struct MemoryQuotaRepository {
    snapshot: std::sync::Mutex<QuotaSnapshot>,
    saves: AtomicUsize,
}

impl MemoryQuotaRepository {
    fn with_record(record: UserQuotaRecord) -> Self {
        let repo = Self::default();
        repo.snapshot
            .lock()
            .unwrap()
            .insert(record.email.clone(), record);
        repo
    }

    fn get(&self, email: &str) -> Option<UserQuotaRecord> {
        self.snapshot.lock().unwrap().get(email).cloned()
    }

    fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuotaRepository for MemoryQuotaRepository {
    async fn load(&self) -> Result<QuotaSnapshot, QuotaRepositoryError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn save(&self, snapshot: &QuotaSnapshot) -> Result<(), QuotaRepositoryError> {
        *self.snapshot.lock().unwrap() = snapshot.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(email: &str, plan: &str, used: u32, quota: u32, last_reset: NaiveDate) -> UserQuotaRecord {
    UserQuotaRecord {
        email: email.to_string(),
        plan: plan.to_string(),
        used,
        quota_limit: quota,
        last_reset: Some(last_reset),
        created_at: None,
    }
}

fn service(repo: &Arc<MemoryQuotaRepository>) -> QuotaService {
    QuotaService::new(repo.clone())
}

#[tokio::test]
async fn test_first_check_creates_free_trial_record() {
    let repo = Arc::new(MemoryQuotaRepository::default());
    let quota = service(&repo);
    let today = date(2025, 5, 20);

    let decision = quota.check_quota_on("new-user@shop.in", today).await.unwrap();

    assert!(decision.allowed);
    assert_eq!(decision.remaining, 5);
    assert_eq!(
        decision.message,
        "Search allowed. 5 searches remaining on Free Trial plan"
    );
    let stored = repo.get("new-user@shop.in").unwrap();
    assert_eq!(stored.plan, "Free Trial");
    assert_eq!(stored.used, 0);
    assert_eq!(stored.quota_limit, 5);
    assert_eq!(stored.last_reset, Some(today));
    assert_eq!(repo.saves(), 1);
}

#[tokio::test]
async fn test_check_without_changes_does_not_save() {
    let today = date(2025, 5, 20);
    let repo = Arc::new(MemoryQuotaRepository::with_record(record(
        "a@shop.in", "Starter", 3, 30, today,
    )));
    let quota = service(&repo);

    quota.check_quota_on("a@shop.in", today).await.unwrap();
    assert_eq!(repo.saves(), 0);
}

#[tokio::test]
async fn test_boundary_at_quota_limit() {
    let today = date(2025, 5, 20);
    let repo = Arc::new(MemoryQuotaRepository::with_record(record(
        "a@shop.in", "Pro", 99, 100, today,
    )));
    let quota = service(&repo);

    let decision = quota.check_quota_on("a@shop.in", today).await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 1);

    quota.increment_usage_on("a@shop.in", today).await.unwrap();
    let decision = quota.check_quota_on("a@shop.in", today).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(
        decision.message,
        "Quota exceeded. Please upgrade your plan. Current plan: Pro (100/100 searches used)"
    );
}

#[tokio::test]
async fn test_daily_plan_resets_on_new_day() {
    let today = date(2025, 5, 20);
    let repo = Arc::new(MemoryQuotaRepository::with_record(record(
        "a@shop.in",
        "Free Trial",
        5,
        5,
        date(2025, 5, 19),
    )));
    let quota = service(&repo);

    let decision = quota.check_quota_on("a@shop.in", today).await.unwrap();

    assert!(decision.allowed);
    let stored = repo.get("a@shop.in").unwrap();
    assert_eq!(stored.used, 0);
    assert_eq!(stored.last_reset, Some(today));
}

#[tokio::test]
async fn test_monthly_plan_resets_regardless_of_day() {
    let repo = Arc::new(MemoryQuotaRepository::with_record(record(
        "a@shop.in",
        "Starter",
        30,
        30,
        date(2025, 1, 31),
    )));
    let quota = service(&repo);

    let decision = quota.check_quota_on("a@shop.in", date(2025, 2, 1)).await.unwrap();

    assert!(decision.allowed);
    assert_eq!(decision.remaining, 30);
    assert_eq!(repo.get("a@shop.in").unwrap().last_reset, Some(date(2025, 2, 1)));
}

#[tokio::test]
async fn test_monthly_plan_keeps_usage_within_month() {
    let repo = Arc::new(MemoryQuotaRepository::with_record(record(
        "a@shop.in",
        "Agency",
        12,
        300,
        date(2025, 2, 1),
    )));
    let quota = service(&repo);

    let decision = quota.check_quota_on("a@shop.in", date(2025, 2, 28)).await.unwrap();
    assert_eq!(decision.used, 12);
    assert_eq!(decision.remaining, 288);
}

#[tokio::test]
async fn test_reset_refreshes_cached_quota_limit() {
    let repo = Arc::new(MemoryQuotaRepository::with_record(record(
        "a@shop.in",
        "Ultimate",
        40,
        50,
        date(2025, 5, 19),
    )));
    let quota = service(&repo);

    let record = quota.reset_if_needed_on("a@shop.in", date(2025, 5, 20)).await.unwrap();
    assert_eq!(record.used, 0);
    assert_eq!(record.quota_limit, 100);
}

#[tokio::test]
async fn test_increment_creates_record_and_counts() {
    let repo = Arc::new(MemoryQuotaRepository::default());
    let quota = service(&repo);
    let today = date(2025, 5, 20);

    assert_eq!(quota.increment_usage_on("b@shop.in", today).await.unwrap(), 1);
    assert_eq!(quota.increment_usage_on("b@shop.in", today).await.unwrap(), 2);
    assert_eq!(repo.get("b@shop.in").unwrap().used, 2);
}

#[tokio::test]
async fn test_increment_does_not_enforce_cap() {
    let today = date(2025, 5, 20);
    let repo = Arc::new(MemoryQuotaRepository::with_record(record(
        "a@shop.in", "Free Trial", 5, 5, today,
    )));
    let quota = service(&repo);

    assert_eq!(quota.increment_usage_on("a@shop.in", today).await.unwrap(), 6);
}

#[tokio::test]
async fn test_plan_change_applies_registry_values() {
    let today = date(2025, 5, 20);
    for plan in PlanRegistry::all() {
        let repo = Arc::new(MemoryQuotaRepository::with_record(record(
            "a@shop.in", "Free Trial", 4, 5, today,
        )));
        let quota = service(&repo);

        assert!(quota
            .update_user_plan_on("a@shop.in", plan.name, today)
            .await
            .unwrap());
        let stored = repo.get("a@shop.in").unwrap();
        assert_eq!(stored.plan, plan.name);
        assert_eq!(stored.quota_limit, plan.quota_limit);
        assert_eq!(stored.used, 0);
        assert_eq!(stored.last_reset, Some(today));
    }
}

#[tokio::test]
async fn test_unknown_plan_is_rejected_without_mutation() {
    let today = date(2025, 5, 20);
    let repo = Arc::new(MemoryQuotaRepository::with_record(record(
        "a@shop.in", "Starter", 7, 30, today,
    )));
    let quota = service(&repo);

    assert!(!quota
        .update_user_plan_on("a@shop.in", "Enterprise", today)
        .await
        .unwrap());
    assert_eq!(repo.get("a@shop.in").unwrap().used, 7);
    assert_eq!(repo.saves(), 0);
}

#[tokio::test]
async fn test_plan_and_status_for_unknown_user() {
    let repo = Arc::new(MemoryQuotaRepository::default());
    let quota = service(&repo);

    assert_eq!(quota.get_user_plan("ghost@shop.in").await.unwrap(), "Free Trial");
    let status = quota.get_user_status("ghost@shop.in").await.unwrap();
    assert_eq!(status.last_reset, "Never");
    assert!(repo.get("ghost@shop.in").is_none());
}

#[tokio::test]
async fn test_concurrent_increments_are_not_lost() {
    let repo = Arc::new(MemoryQuotaRepository::default());
    let quota = Arc::new(service(&repo));
    let today = date(2025, 5, 20);

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let quota = quota.clone();
            tokio::spawn(async move { quota.increment_usage_on("c@shop.in", today).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(repo.get("c@shop.in").unwrap().used, 20);
}
