//! 图片临时 URL 缓存
//!
//! 以对象引用（对象键或完整 URL）为键，缓存签名服务返回的临时 URL 及其过期时间。
//! 缓存有效期在写入时确定，并且严格短于签名本身的有效期，
//! 保证永远不会返回一个签名服务认为已经过期的 URL。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

/// 默认缓存有效期：1.5 小时（签名有效期为 2 小时）
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(90 * 60);

/// 单个缓存条目，只整体替换，不原地修改
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub signed_url: String,
    pub expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// 批量查询结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchLookup {
    /// 命中的引用，保持输入中的相对顺序
    pub hit: Vec<String>,
    /// 未命中或已过期的引用，保持输入中的相对顺序
    pub miss: Vec<String>,
    /// 命中引用到临时 URL 的映射
    pub hit_map: HashMap<String, String>,
}

/// 缓存统计信息
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// 进程内共享的临时 URL 缓存
///
/// 所有操作都是同步的内存操作，锁只在单次调用内持有，不会跨越 `.await`。
/// 通过 `Arc<UrlCache>` 在各组件之间共享。
#[derive(Debug)]
pub struct UrlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for UrlCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl UrlCache {
    /// 创建缓存实例
    ///
    /// # 参数
    ///
    /// * `ttl` - 条目写入后的有效期，应严格短于签名有效期
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // 锁内不会 panic，中毒时直接沿用内部数据
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 获取单个引用的临时 URL
    ///
    /// 仅当条目存在且未过期时返回。条目已过期时会在返回前将其删除，
    /// 之后的查询不会再看到这个过期值。
    pub fn get(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }

        let mut entries = self.lock();
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => {
                debug!(key, "url cache hit");
                Some(entry.signed_url.clone())
            }
            Some(_) => {
                debug!(key, "url cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// 写入单个引用的临时 URL
    ///
    /// 引用或临时 URL 为空时忽略，空的回退值不能被当作有效签名缓存。
    /// 已有条目会被整体覆盖，过期时间重新计算。
    pub fn set(&self, key: &str, signed_url: &str) {
        if key.is_empty() || signed_url.is_empty() {
            return;
        }

        let Some(expires_at) = Instant::now().checked_add(self.ttl) else {
            warn!(key, ttl = ?self.ttl, "url cache ttl overflows the clock, entry not cached");
            return;
        };

        let entry = CacheEntry {
            signed_url: signed_url.to_string(),
            expires_at,
        };
        self.lock().insert(key.to_string(), entry);
        debug!(key, "url cache set");
    }

    /// 批量查询
    ///
    /// 每个引用按与 [`UrlCache::get`] 相同的规则独立判断，去重由调用方负责。
    pub fn get_batch<S: AsRef<str>>(&self, keys: &[S]) -> BatchLookup {
        let mut lookup = BatchLookup::default();

        for key in keys {
            let key = key.as_ref();
            match self.get(key) {
                Some(signed_url) => {
                    lookup.hit.push(key.to_string());
                    lookup.hit_map.insert(key.to_string(), signed_url);
                }
                None => lookup.miss.push(key.to_string()),
            }
        }

        debug!(
            total = keys.len(),
            hit = lookup.hit.len(),
            miss = lookup.miss.len(),
            "url cache batch lookup"
        );
        lookup
    }

    /// 批量写入
    ///
    /// 两个序列长度不一致时不写入任何条目，只记录告警；
    /// 否则逐对按 [`UrlCache::set`] 写入，空值对会被跳过。
    pub fn set_batch<K: AsRef<str>, V: AsRef<str>>(&self, keys: &[K], signed_urls: &[V]) {
        if keys.len() != signed_urls.len() {
            warn!(
                keys = keys.len(),
                signed_urls = signed_urls.len(),
                "url cache batch set skipped: length mismatch"
            );
            return;
        }

        for (key, signed_url) in keys.iter().zip(signed_urls) {
            self.set(key.as_ref(), signed_url.as_ref());
        }
        debug!(count = keys.len(), "url cache batch set");
    }

    /// 清理所有已过期的条目，返回清理数量
    pub fn clear_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    /// 清空所有条目
    pub fn clear(&self) {
        let mut entries = self.lock();
        let size = entries.len();
        entries.clear();
        debug!(size, "url cache cleared");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前缓存的条目数和引用列表（包括尚未被清理的过期条目）
    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }
}
