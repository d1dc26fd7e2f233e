//! 错误类型模块
//!
//! 缓存与批量解析层不向调用方返回错误，这里只定义签发端和配置加载的错误。

use thiserror::Error;

/// 签发临时 URL 时可能出现的错误
#[derive(Debug, Error)]
pub enum IssuerError {
    /// 引用为空，无法签名
    #[error("empty object reference")]
    EmptyReference,

    /// 预签名配置或生成失败
    #[error("presign failed: {0}")]
    Presign(String),

    /// 网络请求失败
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 签名服务返回非 2xx 状态码
    #[error("signing service returned status {0}")]
    Status(http::StatusCode),

    /// 响应体无法解析为签名响应
    #[error("failed to decode signing response: {0}")]
    Decode(#[from] serde_json::Error),

    /// 签名服务明确返回失败
    #[error("signing service rejected request: {0}")]
    Rejected(String),

    /// 响应缺少必须的字段
    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    /// 批量签名结果与请求数量不一致
    #[error("expected {expected} signed urls, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    /// 缓存有效期必须严格短于签名有效期，否则缓存可能返回已过期的签名
    #[error("cache ttl ({ttl_secs}s) must be shorter than signature window ({window_secs}s)")]
    TtlNotShorterThanWindow { ttl_secs: u64, window_secs: u64 },
}
