//! 远程签名服务客户端
//!
//! 通过 HTTP 调用实现了 `POST /sign` 协议的签名服务：
//!
//! ```json
//! // 请求
//! { "url": "images/a.jpg", "expired": 7200 }
//! { "urls": ["images/a.jpg", "images/b.jpg"], "expired": 7200 }
//! // 响应
//! { "success": true, "url": "https://..." }
//! { "success": true, "urls": ["https://...", "https://..."] }
//! { "success": false, "error": "..." }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::UrlIssuer;
use crate::error::IssuerError;

/// 签名请求体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(default = "default_expired")]
    pub expired: u64,
}

fn default_expired() -> u64 {
    3600
}

/// 签名响应体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SignResponse {
    pub fn single(url: String) -> Self {
        Self {
            success: true,
            url: Some(url),
            ..Default::default()
        }
    }

    pub fn batch(urls: Vec<String>) -> Self {
        Self {
            success: true,
            urls: Some(urls),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// 远程签名服务的默认请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// 调用远程签名服务的签发端
///
/// 超时由 HTTP 客户端负责，缓存与解析层自身不设超时。
#[derive(Debug, Clone)]
pub struct RemoteIssuer {
    client: Client,
    endpoint: String,
}

impl RemoteIssuer {
    /// 使用默认超时创建签发端
    ///
    /// # 参数
    ///
    /// * `endpoint` - 签名服务的完整地址，如 `https://example.com/sign`。
    pub fn new(endpoint: impl Into<String>) -> Result<Self, IssuerError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn call(&self, request: &SignRequest) -> Result<SignResponse, IssuerError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IssuerError::Status(status));
        }

        let bytes = response.bytes().await?;
        let body: SignResponse = serde_json::from_slice(&bytes)?;
        if !body.success {
            return Err(IssuerError::Rejected(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl UrlIssuer for RemoteIssuer {
    async fn sign(&self, reference: &str, expires_in: u64) -> Result<String, IssuerError> {
        let request = SignRequest {
            url: Some(reference.to_string()),
            urls: None,
            expired: expires_in,
        };

        let url = self
            .call(&request)
            .await?
            .url
            .filter(|url| !url.is_empty())
            .ok_or(IssuerError::MissingField("url"))?;
        Ok(url)
    }

    async fn sign_batch(
        &self,
        references: &[String],
        expires_in: u64,
    ) -> Result<Vec<String>, IssuerError> {
        let request = SignRequest {
            url: None,
            urls: Some(references.to_vec()),
            expired: expires_in,
        };

        let urls = self
            .call(&request)
            .await?
            .urls
            .ok_or(IssuerError::MissingField("urls"))?;

        if urls.len() != references.len() {
            return Err(IssuerError::LengthMismatch {
                expected: references.len(),
                actual: urls.len(),
            });
        }

        debug!(count = urls.len(), "remote issuer signed batch");
        Ok(urls)
    }
}
