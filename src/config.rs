//! 图片 URL 服务的配置模块。
//!
//! 该模块负责从环境变量加载和校验配置。S3 凭据、区域和端点
//! 通过标准 AWS 环境变量由 `aws-config` 读取，不在这里处理。

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::Level;

use crate::cache::{DEFAULT_CACHE_TTL, DEFAULT_SWEEP_INTERVAL};
use crate::error::ConfigError;
use crate::issuer::{DEFAULT_SIGN_EXPIRES_SECS, MAX_SIGN_EXPIRES_SECS};
use crate::issuer::s3::DEFAULT_KEY_MARKER;

/// 服务配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 监听地址，`BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// 存储桶名称，`S3_BUCKET`
    pub bucket: String,
    /// 完整 URL 中对象键之前的域名标记，`OBJECT_KEY_MARKER`
    pub key_marker: String,
    /// 签名有效期（秒），`SIGN_EXPIRES_SECS`
    pub sign_expires_secs: u64,
    /// 缓存有效期，`CACHE_TTL_SECS`
    pub cache_ttl: Duration,
    /// 过期清理间隔，`SWEEP_INTERVAL_SECS`
    pub sweep_interval: Duration,
    /// 远程签名服务地址，`SIGN_ENDPOINT`；未设置时解析器直接使用 S3 预签名
    pub sign_endpoint: Option<String>,
    /// 日志级别，`LOG_LEVEL`
    pub log_level: Level,
}

impl Config {
    /// 从进程环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 使用自定义的变量查找函数加载配置
    ///
    /// # 参数
    ///
    /// * `lookup` - 根据变量名返回变量值，未设置时返回 `None`
    ///
    /// # Errors
    ///
    /// 必需变量缺失、变量无法解析、签名有效期超过 7 天，
    /// 或者缓存有效期不短于签名有效期时返回错误。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket = lookup("S3_BUCKET")
            .filter(|bucket| !bucket.is_empty())
            .ok_or(ConfigError::Missing("S3_BUCKET"))?;

        let sign_expires_secs = parse_or(&lookup, "SIGN_EXPIRES_SECS", DEFAULT_SIGN_EXPIRES_SECS)?;
        if sign_expires_secs > MAX_SIGN_EXPIRES_SECS {
            return Err(ConfigError::Invalid {
                name: "SIGN_EXPIRES_SECS",
                value: sign_expires_secs.to_string(),
            });
        }
        let cache_ttl_secs = parse_or(&lookup, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL.as_secs())?;
        if cache_ttl_secs >= sign_expires_secs {
            return Err(ConfigError::TtlNotShorterThanWindow {
                ttl_secs: cache_ttl_secs,
                window_secs: sign_expires_secs,
            });
        }

        let sweep_interval_secs =
            parse_or(&lookup, "SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL.as_secs())?;
        if sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            bucket,
            key_marker: lookup("OBJECT_KEY_MARKER")
                .unwrap_or_else(|| DEFAULT_KEY_MARKER.to_string()),
            sign_expires_secs,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            sign_endpoint: lookup("SIGN_ENDPOINT").filter(|endpoint| !endpoint.is_empty()),
            log_level: parse_or(&lookup, "LOG_LEVEL", Level::INFO)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
