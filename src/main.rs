use std::sync::Arc;

use anyhow::Context;
use park_image_server::cache::{CacheSweeper, UrlCache};
use park_image_server::config::Config;
use park_image_server::issuer::{RemoteIssuer, S3Issuer, UrlIssuer};
use park_image_server::resolver::ImageUrlResolver;
use park_image_server::{AppState, app};
use tracing::info;
use tracing_subscriber::fmt::time::LocalTime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_timer(LocalTime::rfc_3339())
        .with_max_level(config.log_level)
        .init();

    // 初始化 S3 客户端，凭据和端点来自标准 AWS 环境变量
    let s3_config = aws_config::load_from_env().await;
    let s3_client = Arc::new(aws_sdk_s3::Client::new(&s3_config));
    let signer: Arc<dyn UrlIssuer> = Arc::new(S3Issuer::new(
        s3_client,
        config.bucket.clone(),
        config.key_marker.clone(),
    ));

    // 进程级共享缓存和定时清理
    let cache = Arc::new(UrlCache::new(config.cache_ttl));
    let sweeper = CacheSweeper::start(cache.clone(), config.sweep_interval);

    // 配置了远程签名服务时，解析器通过它签发；/sign 始终使用本地预签名
    let issuer: Arc<dyn UrlIssuer> = match &config.sign_endpoint {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "resolving image urls through remote signing service");
            Arc::new(RemoteIssuer::new(endpoint.clone()).context("failed to build http client")?)
        }
        None => signer.clone(),
    };

    let resolver = ImageUrlResolver::with_expires_in(cache, issuer, config.sign_expires_secs);
    let router = app(AppState { resolver, signer });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, bucket = %config.bucket, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.stop();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
