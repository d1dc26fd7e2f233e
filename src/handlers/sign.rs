use axum::{Json, extract::State};
use tracing::warn;

use crate::AppState;
use crate::issuer::remote::{SignRequest, SignResponse};

/// 处理签名请求
///
/// 为单个或一组对象引用生成临时访问 URL，协议与 [`crate::issuer::RemoteIssuer`] 对应。
/// 无论成功与否都返回 200，失败信息放在响应体的 `error` 字段中。
///
/// # 请求方法
///
/// POST /sign
///
/// # 请求示例
///
/// ```json
/// { "urls": ["images/a.jpg", "https://parks.cos.ap-guangzhou.myqcloud.com/images/b.jpg"], "expired": 7200 }
/// ```
///
/// # 响应示例
///
/// ```json
/// { "success": true, "urls": ["https://...", "https://..."] }
/// ```
pub async fn handle_sign(
    State(state): State<AppState>,
    Json(request): Json<SignRequest>,
) -> Json<SignResponse> {
    let result = match (request.url, request.urls) {
        (Some(url), _) if !url.is_empty() => state
            .signer
            .sign(&url, request.expired)
            .await
            .map(SignResponse::single),
        (_, Some(urls)) => state
            .signer
            .sign_batch(&urls, request.expired)
            .await
            .map(SignResponse::batch),
        _ => return Json(SignResponse::failure("url or urls is required")),
    };

    match result {
        Ok(response) => Json(response),
        Err(e) => {
            warn!(error = %e, "failed to generate signed url");
            Json(SignResponse::failure(e.to_string()))
        }
    }
}
