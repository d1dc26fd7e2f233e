//! 缓存模块
//!
//! 该模块负责图片临时 URL 的内存缓存及其定时清理。

pub mod store;
pub mod sweeper;

// 重新导出常用的类型
pub use store::{BatchLookup, CacheEntry, CacheStats, DEFAULT_CACHE_TTL, UrlCache};
pub use sweeper::{CacheSweeper, DEFAULT_SWEEP_INTERVAL};
