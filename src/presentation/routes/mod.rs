// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::{
    lead_service::LeadService, quota_service::QuotaService, report_service::ReportService,
};
use crate::presentation::handlers::{quota_handler, scrape_handler};
use axum::{
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 处理器共享的服务实例
#[derive(Clone)]
pub struct AppServices {
    pub leads: Arc<LeadService>,
    pub quota: Arc<QuotaService>,
    pub reports: Arc<ReportService>,
}

/// 创建注入了服务并带请求追踪的完整应用
pub fn app(services: AppServices) -> Router {
    routes()
        .layer(Extension(services.leads))
        .layer(Extension(services.quota))
        .layer(Extension(services.reports))
        .layer(TraceLayer::new_for_http())
}

/// 创建应用路由
///
/// 服务实例通过 `Extension` 层注入
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route("/scrape", post(scrape_handler::scrape_leads))
        .route("/quota/{email}", get(quota_handler::check_quota))
        .route("/quota/{email}/status", get(quota_handler::quota_status))
        .route("/quota/{email}/plan", put(quota_handler::update_plan));

    Router::new().merge(public_routes).merge(api_routes)
}

/// 服务说明
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /scrape": "Search, scrape and export leads",
            "GET /quota/{email}": "Check whether a user can search",
            "GET /quota/{email}/status": "Quota usage for a user",
            "PUT /quota/{email}/plan": "Change a user's plan",
            "GET /health": "Health check"
        },
        "example_request": {
            "niche": "restaurants",
            "location": "Mumbai",
            "email": "user@example.com"
        }
    }))
}

/// 健康检查端点
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
