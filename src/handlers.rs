//! HTTP请求处理模块
//!
//! 此模块包含了处理不同类型HTTP请求的所有处理器：
//! - 签名处理器（签发临时 URL）
//! - 解析处理器（带缓存的批量解析、预加载、缓存统计）

pub mod resolve;
pub mod sign;

// 重新导出主要的公共接口
pub use resolve::{handle_cache_stats, handle_preload, handle_resolve_many, handle_resolve_one};
pub use sign::handle_sign;
