//! 公园图片临时 URL 服务库
//!
//! 把对象存储中的永久对象引用转换为有时效的签名 URL，主要功能包括：
//! - 进程内临时 URL 缓存，带惰性过期删除和定时清理
//! - 批量解析：只为缓存缺失的部分调用签发端，失败时退回原始引用
//! - S3 预签名签发端和远程签名服务客户端
//! - 公园文档到页面视图模型的字段回退解析

pub mod cache;
pub mod config;
pub mod error;
pub mod fields;
pub mod handlers;
pub mod issuer;
pub mod place;
pub mod resolver;
pub mod utils;

use std::sync::Arc;

use axum::routing::{get, post};
use http::Method;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::issuer::UrlIssuer;
use crate::resolver::ImageUrlResolver;

/// 应用状态，在各处理器之间共享
#[derive(Clone)]
pub struct AppState {
    /// 带缓存的图片 URL 解析器
    pub resolver: ImageUrlResolver,
    /// `/sign` 使用的签发端
    pub signer: Arc<dyn UrlIssuer>,
}

/// 创建并配置Axum应用程序
///
/// 此函数设置了一个完整的HTTP服务器，包括：
/// - CORS配置，允许GET、POST和OPTIONS请求
/// - 请求追踪中间件
/// - 签名、解析、预加载和缓存统计路由
///
/// # Returns
///
/// 返回配置好的Axum Router实例
pub fn app(state: AppState) -> axum::Router {
    // 配置 CORS
    let cors = CorsLayer::permissive()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::any());

    axum::Router::new()
        .route("/sign", post(handlers::handle_sign))
        .route(
            "/resolve",
            get(handlers::handle_resolve_one).post(handlers::handle_resolve_many),
        )
        .route("/preload", post(handlers::handle_preload))
        .route("/cache/stats", get(handlers::handle_cache_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
