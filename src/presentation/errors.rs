// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// 面向客户端的请求错误，消息原样返回
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    QuotaExceeded(String),
    #[error("{0}")]
    NotFound(String),
}

/// 应用错误类型
///
/// 封装所有可能的应用层错误。`ApiError` 映射到对应的 4xx 状态码，
/// 其他错误一律返回 500，细节只写入日志。
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<ApiError>() {
            Some(ApiError::BadRequest(_)) => StatusCode::BAD_REQUEST,
            Some(ApiError::QuotaExceeded(_)) => StatusCode::TOO_MANY_REQUESTS,
            Some(ApiError::NotFound(_)) => StatusCode::NOT_FOUND,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:#}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
