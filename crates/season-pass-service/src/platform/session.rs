//! 会话层
//!
//! 登录与凭据刷新由外部负责，这里只把已有凭据附加到每个平台请求上。

use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, COOKIE};
use season_shared::config::PlatformConfig;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const CSRF_HEADER: &str = "x-csrf";

/// 为平台请求附加会话信息
pub trait SessionLayer: Send + Sync {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// 从配置读取的静态凭据
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    api_key: Option<String>,
    csrf_token: Option<String>,
    access_token: Option<String>,
    cookie: Option<String>,
}

impl StaticSession {
    pub fn from_config(config: &PlatformConfig) -> Self {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Self {
            api_key: non_empty(&config.api_key),
            csrf_token: non_empty(&config.csrf_token),
            access_token: non_empty(&config.access_token),
            cookie: non_empty(&config.cookie),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() || self.cookie.is_some()
    }
}

impl SessionLayer for StaticSession {
    fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(csrf) = &self.csrf_token {
            request = request.header(CSRF_HEADER, csrf);
        }
        if let Some(token) = &self.access_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        request
    }
}
