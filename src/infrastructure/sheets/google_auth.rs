// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::repositories::sheet_repository::SheetError;

/// 读写表格和设置共享权限所需的授权范围
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// 断言有效期（秒），Google 允许的上限为一小时
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// 令牌到期前提前刷新的秒数
const REFRESH_MARGIN_SECS: i64 = 60;

/// 服务账号凭据文件（`credentials.json`）中用到的字段
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PKCS#8 PEM 格式的 RSA 私钥
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            SheetError::Auth(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    refresh_at: DateTime<Utc>,
}

/// 服务账号令牌提供者
///
/// 用私钥签发 RS256 JWT 断言换取访问令牌，并缓存到到期前一分钟
pub struct ServiceAccountTokens {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    pub fn new(key: ServiceAccountKey) -> Result<Self, SheetError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetError::Auth(format!("Invalid service account key: {}", e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Ok(Self {
            client,
            key,
            encoding_key,
            cached: RwLock::new(None),
        })
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        Self::new(ServiceAccountKey::from_file(path).await?)
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, SheetError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| SheetError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    /// 返回有效的访问令牌，缓存过期时重新换取
    pub async fn token(&self) -> Result<String, SheetError> {
        let now = Utc::now();
        if let Some(cached) = self.cached.read().await.as_ref() {
            if now < cached.refresh_at {
                return Ok(cached.token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Re-check under the write lock
        if let Some(current) = cached.as_ref() {
            if now < current.refresh_at {
                return Ok(current.token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken, SheetError> {
        let assertion = self.assertion(now)?;
        debug!(token_uri = %self.key.token_uri, "Exchanging service account assertion");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Auth(format!(
                "Token exchange failed ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let body: TokenResponse = response.json().await?;
        info!(
            account = %self.key.client_email,
            expires_in = body.expires_in,
            "Obtained service account access token"
        );

        let lifetime = (body.expires_in - REFRESH_MARGIN_SECS).max(0);
        Ok(CachedToken {
            token: body.access_token,
            refresh_at: now + ChronoDuration::seconds(lifetime),
        })
    }
}

/// 访问令牌来源
pub enum TokenSource {
    /// 配置或环境变量中的固定令牌
    Static(String),
    /// 服务账号凭据换取的令牌
    ServiceAccount(ServiceAccountTokens),
}

impl TokenSource {
    pub async fn token(&self) -> Result<String, SheetError> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount(tokens) => tokens.token().await,
        }
    }
}

impl From<&str> for TokenSource {
    fn from(token: &str) -> Self {
        TokenSource::Static(token.to_string())
    }
}

impl From<String> for TokenSource {
    fn from(token: String) -> Self {
        TokenSource::Static(token)
    }
}
