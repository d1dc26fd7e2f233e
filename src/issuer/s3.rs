//! S3 预签名签发端
//!
//! 该模块负责为存储桶中的对象生成预签名 URL。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use tracing::debug;

use super::UrlIssuer;
use crate::error::IssuerError;
use crate::utils::headers::guess_mime_type;
use crate::utils::path::extract_object_key;

/// 默认的对象 URL 域名标记，完整 URL 中该标记之后的部分即为对象键
pub const DEFAULT_KEY_MARKER: &str = ".myqcloud.com/";

/// 使用 S3 客户端直接生成预签名 URL 的签发端
#[derive(Debug, Clone)]
pub struct S3Issuer {
    client: Arc<Client>,
    bucket: String,
    key_marker: String,
}

impl S3Issuer {
    /// 创建签发端
    ///
    /// # 参数
    ///
    /// * `client` - S3 客户端实例。
    /// * `bucket` - 存储桶名称。
    /// * `key_marker` - 从完整 URL 中提取对象键时使用的域名标记。
    pub fn new(
        client: Arc<Client>,
        bucket: impl Into<String>,
        key_marker: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key_marker: key_marker.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// 为单个对象生成预签名 URL
    ///
    /// 如果能从扩展名猜出 MIME 类型，会附带 `response-content-type`，
    /// 保证图片在客户端直接展示而不是被下载。
    async fn presign(&self, reference: &str, expires_in: u64) -> Result<String, IssuerError> {
        let key = extract_object_key(reference, &self.key_marker);
        if key.is_empty() {
            return Err(IssuerError::EmptyReference);
        }

        let presigning_config = PresigningConfig::expires_in(Duration::from_secs(expires_in))
            .map_err(|e| IssuerError::Presign(e.to_string()))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .set_response_content_type(guess_mime_type(key))
            .presigned(presigning_config)
            .await
            .map_err(|e| IssuerError::Presign(e.to_string()))?;

        debug!(key, expires_in, "presigned object url");
        Ok(presigned_request.uri().to_string())
    }
}

#[async_trait]
impl UrlIssuer for S3Issuer {
    async fn sign(&self, reference: &str, expires_in: u64) -> Result<String, IssuerError> {
        self.presign(reference, expires_in).await
    }

    async fn sign_batch(
        &self,
        references: &[String],
        expires_in: u64,
    ) -> Result<Vec<String>, IssuerError> {
        // 预签名只在本地计算，无需并发
        let mut signed = Vec::with_capacity(references.len());
        for reference in references {
            signed.push(self.presign(reference, expires_in).await?);
        }
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    fn test_issuer() -> S3Issuer {
        let credentials = Credentials::new("AKIDEXAMPLE", "secret", None, None, "test-credentials");
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new("ap-guangzhou"))
            .endpoint_url("https://cos.ap-guangzhou.myqcloud.com")
            .build();

        S3Issuer::new(
            Arc::new(Client::from_conf(config)),
            "parks-1391406291",
            DEFAULT_KEY_MARKER,
        )
    }

    #[tokio::test]
    async fn test_sign_returns_presigned_url() {
        let url = test_issuer().sign("images/park.jpg", 7200).await.unwrap();

        assert!(url.starts_with("https://"));
        assert!(url.contains("images/park.jpg"));
        assert!(url.contains("X-Amz-Signature"));
        assert!(url.contains("X-Amz-Expires=7200"));
        assert!(url.contains("response-content-type=image%2Fjpeg"));
    }

    #[tokio::test]
    async fn test_sign_extracts_key_from_full_url() {
        let url = test_issuer()
            .sign(
                "https://parks-1391406291.cos.ap-guangzhou.myqcloud.com/images/a.png",
                600,
            )
            .await
            .unwrap();

        assert!(url.contains("images/a.png"));
        assert!(!url.contains("https%3A"));
    }

    #[tokio::test]
    async fn test_sign_empty_reference_fails() {
        let result = test_issuer().sign("", 600).await;
        assert!(matches!(result, Err(IssuerError::EmptyReference)));
    }

    #[tokio::test]
    async fn test_sign_batch_preserves_order() {
        let references = vec!["images/1.jpg".to_string(), "images/2.jpg".to_string()];
        let urls = test_issuer().sign_batch(&references, 600).await.unwrap();

        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("images/1.jpg"));
        assert!(urls[1].contains("images/2.jpg"));
    }

    #[tokio::test]
    async fn test_sign_batch_fails_on_any_empty_reference() {
        let references = vec!["images/1.jpg".to_string(), String::new()];
        let result = test_issuer().sign_batch(&references, 600).await;
        assert!(result.is_err());
    }
}
