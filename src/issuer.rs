//! 临时 URL 签发模块
//!
//! 签发端把对象引用转换成有时效的签名 URL，可能失败、可能较慢。
//! - `s3`：直接使用 S3 兼容存储的预签名能力
//! - `remote`：调用远程签名服务（`POST /sign` 协议）

pub mod remote;
pub mod s3;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::IssuerError;

pub use remote::RemoteIssuer;
pub use s3::S3Issuer;

/// 默认签名有效期（秒）：2 小时
pub const DEFAULT_SIGN_EXPIRES_SECS: u64 = 2 * 60 * 60;

/// 预签名 URL 允许的最长有效期（秒）：7 天
pub const MAX_SIGN_EXPIRES_SECS: u64 = 7 * 24 * 60 * 60;

/// 签发临时 URL 的能力
///
/// 批量签发的结果必须与输入按位置一一对应，调用方不会按内容重新匹配。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UrlIssuer: Send + Sync {
    /// 为单个对象引用签发临时 URL
    async fn sign(&self, reference: &str, expires_in: u64) -> Result<String, IssuerError>;

    /// 为一组对象引用签发临时 URL
    async fn sign_batch(
        &self,
        references: &[String],
        expires_in: u64,
    ) -> Result<Vec<String>, IssuerError>;
}
