//! 平台响应解释
//!
//! 所有请求共用同一套规则：
//! - Content-Type 含 `application/json` 时解析响应体，非 2xx 取响应体中的消息字段作为失败原因
//! - 其余内容类型一律失败，失败原因为 HTTP 状态描述
//! - 平台信封的 `ErrorCode` 存在且不为 1 时，即使 2xx 也视为失败

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// 平台信封中表示成功的 ErrorCode
pub const PLATFORM_SUCCESS_CODE: i64 = 1;

/// 失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 请求未收到响应（连接、超时等）
    Transport,
    /// 非 2xx 响应或非 JSON 响应
    Http,
    /// 2xx 但平台信封报告错误
    Api,
    /// 响应体无法解析为预期结构
    Decode,
}

/// 平台调用失败
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PlatformFailure {
    pub kind: FailureKind,
    /// HTTP 状态码，`None` 表示请求未收到响应
    pub status: Option<u16>,
    pub message: String,
    pub error_status: Option<String>,
    pub error_code: Option<i64>,
}

pub type PlatformResult<T> = std::result::Result<T, PlatformFailure>;

impl PlatformFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            status: None,
            message: message.into(),
            error_status: None,
            error_code: None,
        }
    }

    pub fn decode(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Decode,
            status,
            message: message.into(),
            error_status: None,
            error_code: None,
        }
    }

    /// ErrorStatus 或 Message 是否包含任一关键字（不区分大小写）
    pub fn mentions<S: AsRef<str>>(&self, markers: &[S]) -> bool {
        let message = self.message.to_lowercase();
        let error_status = self
            .error_status
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        markers
            .iter()
            .map(|m| m.as_ref().to_lowercase())
            .filter(|m| !m.is_empty())
            .any(|m| message.contains(&m) || error_status.contains(&m))
    }

    /// 用于日志和错误信息的简短描述
    pub fn describe(&self) -> String {
        match (&self.error_status, self.status) {
            (Some(error_status), _) => format!("{} ({})", self.message, error_status),
            (None, Some(status)) => format!("{} (HTTP {})", self.message, status),
            (None, None) => self.message.clone(),
        }
    }
}

impl From<reqwest::Error> for PlatformFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}

/// 失败消息所在的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageField {
    /// 平台 API 信封
    Platform,
    /// 定义表内容主机
    Content,
}

impl MessageField {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Platform => "Message",
            Self::Content => "message",
        }
    }
}

/// 按统一规则解释一个 HTTP 响应
///
/// `reason` 为 HTTP 状态描述（如 "Service Unavailable"）
pub fn interpret_response(
    status: u16,
    reason: &str,
    content_type: Option<&str>,
    body: &[u8],
    field: MessageField,
) -> PlatformResult<Value> {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    let is_success = (200..300).contains(&status);

    if !is_json {
        return Err(PlatformFailure {
            kind: if is_success {
                FailureKind::Decode
            } else {
                FailureKind::Http
            },
            status: Some(status),
            message: reason.to_string(),
            error_status: None,
            error_code: None,
        });
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        PlatformFailure::decode(Some(status), format!("invalid JSON body: {}", e))
    })?;

    if is_success {
        return Ok(value);
    }

    let message = value
        .get(field.key())
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(reason)
        .to_string();

    Err(PlatformFailure {
        kind: FailureKind::Http,
        status: Some(status),
        message,
        error_status: error_status_of(&value),
        error_code: value.get("ErrorCode").and_then(Value::as_i64),
    })
}

/// 拆开平台信封，原样返回 `Response`
///
/// 成功信封的 `Response` 可能为 null 或缺失，此时返回 `Value::Null`
pub fn unwrap_envelope_payload(status: u16, envelope: Value) -> PlatformResult<Value> {
    let error_code = envelope.get("ErrorCode").and_then(Value::as_i64);
    if let Some(code) = error_code.filter(|&c| c != PLATFORM_SUCCESS_CODE) {
        let message = envelope
            .get(MessageField::Platform.key())
            .and_then(Value::as_str)
            .unwrap_or("platform reported an error")
            .to_string();
        return Err(PlatformFailure {
            kind: FailureKind::Api,
            status: Some(status),
            message,
            error_status: error_status_of(&envelope),
            error_code: Some(code),
        });
    }

    Ok(match envelope {
        Value::Object(mut map) => map.remove("Response").unwrap_or(Value::Null),
        _ => Value::Null,
    })
}

/// 拆开平台信封，取出 `Response` 并解析为目标类型
pub fn unwrap_envelope<T: DeserializeOwned>(status: u16, envelope: Value) -> PlatformResult<T> {
    let response = unwrap_envelope_payload(status, envelope)?;
    if response.is_null() {
        return Err(PlatformFailure::decode(
            Some(status),
            "envelope has no Response",
        ));
    }

    serde_json::from_value(response)
        .map_err(|e| PlatformFailure::decode(Some(status), format!("unexpected Response: {}", e)))
}

fn error_status_of(value: &Value) -> Option<String> {
    value
        .get("ErrorStatus")
        .and_then(Value::as_str)
        .map(str::to_string)
}
