// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::dto::{scrape_request::ScrapeRequestDto, scrape_response::ScrapeResponseDto};
use crate::domain::services::{
    lead_service::LeadService, quota_service::QuotaService, report_service::ReportService,
};
use crate::presentation::errors::{ApiError, AppError};

pub const MISSING_FIELDS_MESSAGE: &str = "Missing niche or location in request";
pub const NO_DATA_MESSAGE: &str = "No data found";

/// 线索抓取端点
///
/// 校验请求、检查配额、搜索抓取、导出表格，最后才计入用量。
/// 任一步骤失败都不会消耗配额。
pub async fn scrape_leads(
    Extension(leads): Extension<Arc<LeadService>>,
    Extension(quota): Extension<Arc<QuotaService>>,
    Extension(reports): Extension<Arc<ReportService>>,
    payload: Result<Json<ScrapeRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected scrape body: {}", e);
        ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string())
    })?;
    let (niche, location) = request
        .target()
        .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()))?;
    let email = request.user_email();

    if let Some(email) = email {
        let decision = quota.check_quota(email).await?;
        if !decision.allowed {
            return Err(ApiError::QuotaExceeded(decision.message).into());
        }
    }

    info!(niche, location, "Starting scrape");
    let results = leads.search_and_scrape(niche, location).await?;
    if results.is_empty() {
        return Err(ApiError::NotFound(NO_DATA_MESSAGE.to_string()).into());
    }

    let export = reports.save_to_sheet(&results, niche, location).await?;

    if let Some(email) = email {
        quota.increment_usage(email).await?;
    }

    Ok(Json(ScrapeResponseDto::success(
        export.url,
        results.len(),
        export.manual_share_required,
    )))
}
