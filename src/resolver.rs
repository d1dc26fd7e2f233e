//! 图片 URL 批量解析模块
//!
//! 优先从缓存取临时 URL，只为缓存缺失的部分调用签发端，
//! 签发失败时退回原始引用。此模块的函数不会返回错误，调用方无需处理异常。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::UrlCache;
use crate::issuer::{DEFAULT_SIGN_EXPIRES_SECS, UrlIssuer};

/// 图片 URL 解析器
///
/// 内部只持有共享引用，克隆开销很小。
#[derive(Clone)]
pub struct ImageUrlResolver {
    cache: Arc<UrlCache>,
    issuer: Arc<dyn UrlIssuer>,
    expires_in: u64,
}

impl ImageUrlResolver {
    /// 创建解析器，签名有效期使用默认的 2 小时
    pub fn new(cache: Arc<UrlCache>, issuer: Arc<dyn UrlIssuer>) -> Self {
        Self::with_expires_in(cache, issuer, DEFAULT_SIGN_EXPIRES_SECS)
    }

    /// 创建解析器
    ///
    /// # 参数
    ///
    /// * `cache` - 共享的临时 URL 缓存
    /// * `issuer` - 签发端
    /// * `expires_in` - 传给签发端的签名有效期（秒）
    pub fn with_expires_in(
        cache: Arc<UrlCache>,
        issuer: Arc<dyn UrlIssuer>,
        expires_in: u64,
    ) -> Self {
        Self {
            cache,
            issuer,
            expires_in,
        }
    }

    pub fn cache(&self) -> &Arc<UrlCache> {
        &self.cache
    }

    /// 解析单个图片引用
    ///
    /// 空引用直接返回空字符串；缓存命中直接返回；
    /// 否则调用签发端并写入缓存，签发失败时返回原始引用。
    pub async fn resolve_one(&self, reference: &str) -> String {
        if reference.is_empty() {
            return String::new();
        }

        if let Some(signed_url) = self.cache.get(reference) {
            return signed_url;
        }

        match self.issuer.sign(reference, self.expires_in).await {
            Ok(signed_url) => {
                self.cache.set(reference, &signed_url);
                signed_url
            }
            Err(e) => {
                warn!(reference, error = %e, "failed to sign image url, using original");
                reference.to_string()
            }
        }
    }

    /// 批量解析图片引用
    ///
    /// 返回结果与去掉空引用后的输入一一对应。缓存缺失的引用只通过一次批量调用签发；
    /// 签发失败时，命中缓存的引用仍使用缓存结果，其余退回原始引用。
    pub async fn resolve_many<S: AsRef<str>>(&self, references: &[S]) -> Vec<String> {
        let references: Vec<&str> = references
            .iter()
            .map(|reference| reference.as_ref())
            .filter(|reference| !reference.is_empty())
            .collect();
        if references.is_empty() {
            return Vec::new();
        }

        let lookup = self.cache.get_batch(&references);
        if lookup.miss.is_empty() {
            return map_through(&references, &lookup.hit_map);
        }

        match self.issuer.sign_batch(&lookup.miss, self.expires_in).await {
            Ok(signed_urls) => {
                self.cache.set_batch(&lookup.miss, &signed_urls);

                let mut url_map = lookup.hit_map;
                for (reference, signed_url) in lookup.miss.into_iter().zip(signed_urls) {
                    if !signed_url.is_empty() {
                        url_map.insert(reference, signed_url);
                    }
                }
                map_through(&references, &url_map)
            }
            Err(e) => {
                warn!(
                    missing = lookup.miss.len(),
                    error = %e,
                    "failed to sign image urls, using original for missing"
                );
                map_through(&references, &lookup.hit_map)
            }
        }
    }

    /// 预加载图片引用到缓存，不返回结果，失败只记录日志
    pub async fn preload<S: AsRef<str>>(&self, references: &[S]) {
        let references: Vec<&str> = references
            .iter()
            .map(|reference| reference.as_ref())
            .filter(|reference| !reference.is_empty())
            .collect();
        if references.is_empty() {
            return;
        }

        let lookup = self.cache.get_batch(&references);
        if lookup.miss.is_empty() {
            debug!(count = references.len(), "preload skipped, all urls cached");
            return;
        }

        match self.issuer.sign_batch(&lookup.miss, self.expires_in).await {
            Ok(signed_urls) => {
                self.cache.set_batch(&lookup.miss, &signed_urls);
                debug!(count = lookup.miss.len(), "preloaded image urls");
            }
            Err(e) => warn!(missing = lookup.miss.len(), error = %e, "preload failed"),
        }
    }

    /// 在后台预加载，不阻塞调用方
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn spawn_preload(&self, references: Vec<String>) -> tokio::task::JoinHandle<()> {
        let resolver = self.clone();
        tokio::spawn(async move { resolver.preload(&references).await })
    }
}

fn map_through(references: &[&str], url_map: &HashMap<String, String>) -> Vec<String> {
    references
        .iter()
        .map(|reference| {
            url_map
                .get(*reference)
                .cloned()
                .unwrap_or_else(|| reference.to_string())
        })
        .collect()
}
