use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::cache::CacheStats;

/// 批量解析/预加载请求体
#[derive(Debug, Deserialize)]
pub struct UrlsBody {
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UrlsResponse {
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

/// 批量解析图片引用为可展示的 URL
///
/// # 请求方法
///
/// POST /resolve
///
/// 返回结果与去掉空引用后的输入按顺序一一对应，签发失败的引用原样返回。
pub async fn handle_resolve_many(
    State(state): State<AppState>,
    Json(body): Json<UrlsBody>,
) -> Json<UrlsResponse> {
    let urls = state.resolver.resolve_many(&body.urls).await;
    Json(UrlsResponse { urls })
}

/// 解析单个图片引用
///
/// # 请求方法
///
/// GET /resolve?url=images/a.jpg
pub async fn handle_resolve_one(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Json<UrlResponse> {
    let url = state.resolver.resolve_one(&query.url).await;
    Json(UrlResponse { url })
}

/// 在后台预加载图片引用，立即返回 202
///
/// # 请求方法
///
/// POST /preload
pub async fn handle_preload(
    State(state): State<AppState>,
    Json(body): Json<UrlsBody>,
) -> StatusCode {
    state.resolver.spawn_preload(body.urls);
    StatusCode::ACCEPTED
}

/// 查看缓存统计信息
///
/// # 请求方法
///
/// GET /cache/stats
pub async fn handle_cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.resolver.cache().stats())
}
