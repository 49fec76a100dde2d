// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path},
    response::IntoResponse,
};
use std::sync::Arc;
use validator::Validate;

use crate::application::dto::quota_dto::{QuotaCheckResponseDto, UpdatePlanRequestDto};
use crate::domain::models::plan::PlanRegistry;
use crate::domain::services::quota_service::QuotaService;
use crate::presentation::errors::{ApiError, AppError};

/// 配额检查（会为新用户创建记录并在到期时重置）
pub async fn check_quota(
    Extension(quota): Extension<Arc<QuotaService>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let decision = quota.check_quota(&email).await?;
    Ok(Json(QuotaCheckResponseDto::from_decision(&email, decision)))
}

/// 配额状态（只读）
pub async fn quota_status(
    Extension(quota): Extension<Arc<QuotaService>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(quota.get_user_status(&email).await?))
}

/// 变更套餐
pub async fn update_plan(
    Extension(quota): Extension<Arc<QuotaService>>,
    Path(email): Path<String>,
    payload: Result<Json<UpdatePlanRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    request
        .validate()
        .map_err(|_| ApiError::BadRequest("Plan name is required".to_string()))?;

    if !quota.update_user_plan(&email, &request.plan).await? {
        let known: Vec<&str> = PlanRegistry::all().iter().map(|p| p.name).collect();
        return Err(ApiError::BadRequest(format!(
            "Unknown plan: {}. Available plans: {}",
            request.plan,
            known.join(", ")
        ))
        .into());
    }

    Ok(Json(quota.get_user_status(&email).await?))
}
