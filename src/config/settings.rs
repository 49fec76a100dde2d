// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 默认抓取 User-Agent（桌面版 Chrome）
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 应用程序配置设置
///
/// 包含服务器、搜索、抓取、配额、表格导出和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 搜索服务配置
    pub search: SearchSettings,
    /// 抓取配置
    pub scraper: ScraperSettings,
    /// 配额存储配置
    pub quota: QuotaSettings,
    /// 表格导出配置
    pub sheets: SheetsSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 搜索服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// 搜索 API 端点
    pub endpoint: String,
    /// 搜索 API 密钥，未设置时回退到 `SERPER_API_KEY` 环境变量
    pub api_key: Option<String>,
    /// 单次搜索请求的最大结果数
    pub max_results: u32,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// 单个页面的请求超时（秒）
    pub timeout_secs: u64,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 每次搜索收集的目标结果数
    pub target_results: usize,
}

impl ScraperSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            target_results: 30,
        }
    }
}

/// 配额存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaSettings {
    /// 用户配额快照文件路径
    pub users_file: String,
}

/// 表格导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsSettings {
    /// 导出后端 (local, google)
    pub backend: String,
    /// 本地工作簿根目录 (当 backend=local 时使用)
    pub local_path: String,
    /// 新建表格时使用的名称
    pub spreadsheet_name: String,
    /// 已存在表格的 ID (当 backend=google 时使用)
    pub spreadsheet_id: Option<String>,
    /// Google OAuth 访问令牌，设置后优先于服务账号凭据
    pub access_token: Option<String>,
    /// Google 服务账号凭据文件 (credentials.json)
    pub credentials_file: Option<String>,
    /// 公开共享的最大重试次数
    pub share_retries: u32,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// Prometheus 监听地址
    pub listen: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `LEADRS_` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LEADRS").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 仅使用内置默认值构建配置
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            // Search provider
            .set_default("search.endpoint", "https://google.serper.dev/search")?
            .set_default("search.max_results", 50)?
            // Scraper
            .set_default("scraper.timeout_secs", 15)?
            .set_default("scraper.user_agent", DEFAULT_USER_AGENT)?
            .set_default("scraper.target_results", 30)?
            // Quota snapshot
            .set_default("quota.users_file", "users.json")?
            // Spreadsheet export
            .set_default("sheets.backend", "local")?
            .set_default("sheets.local_path", "./sheets")?
            .set_default("sheets.spreadsheet_name", "Web Scraper Results")?
            .set_default("sheets.share_retries", 3)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen", "0.0.0.0:9000")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;
