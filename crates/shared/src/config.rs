//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::observability::ObservabilityConfig;
use crate::retry::RetryPolicy;

/// 游戏平台接入配置
///
/// 会话凭据（API Key、CSRF、Cookie）由外部会话层提供，这里只负责透传。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// 平台 API 根地址
    pub base_url: String,
    /// 定义表（manifest 组件）所在的内容主机
    pub content_base_url: String,
    pub api_key: Option<String>,
    pub csrf_token: Option<String>,
    pub access_token: Option<String>,
    pub cookie: Option<String>,
    /// 定义表语言
    pub language: String,
    /// 传输层超时（秒），核心组件自身不设超时
    pub timeout_seconds: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.bungie.net".to_string(),
            content_base_url: "https://www.bungie.net".to_string(),
            api_key: None,
            csrf_token: None,
            access_token: None,
            cookie: None,
            language: "en".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl PlatformConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// 领取失败分类配置
///
/// 平台没有为"已被领取"和"进度未达标"提供稳定的错误码，
/// 这里按 ErrorStatus / Message 中的关键字（不区分大小写）判断。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClaimConfig {
    pub already_claimed_markers: Vec<String>,
    pub threshold_markers: Vec<String>,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            already_claimed_markers: vec![
                "AlreadyClaimed".to_string(),
                "already claimed".to_string(),
            ],
            threshold_markers: vec![
                "NotEarned".to_string(),
                "not earned".to_string(),
                "InsufficientProgress".to_string(),
                "not been reached".to_string(),
            ],
        }
    }
}

/// 调用方重试配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            multiplier: policy.multiplier,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub platform: PlatformConfig,
    pub claim: ClaimConfig,
    pub retry: RetryConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. .env 文件（仅注入进程环境变量）
    /// 2. config/default.toml（默认配置）
    /// 3. config/{environment}.toml（环境特定配置）
    /// 4. config/{service_name}.toml（服务特定配置）
    /// 5. 环境变量（SEASON 前缀，双下划线分隔，如 SEASON__PLATFORM__API_KEY -> platform.api_key）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        // .env 不存在是正常情况
        let _ = dotenvy::dotenv();

        let env = std::env::var("SEASON_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("SEASON")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("claim.already_claimed_markers")
                    .with_list_parse_key("claim.threshold_markers")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.observability.service_name = config.service_name.clone();

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
