//! 过期缓存的定时清理任务
//!
//! 读取时的惰性删除只覆盖被再次访问的条目，
//! 只查询过一次的引用需要依靠这里的定时清理回收内存。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use super::UrlCache;

/// 默认清理间隔：10 分钟
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// 定时清理任务的句柄
///
/// 调用 [`CacheSweeper::stop`] 或者丢弃句柄都会取消后台任务。
#[derive(Debug)]
pub struct CacheSweeper {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CacheSweeper {
    /// 启动定时清理任务，第一次清理发生在一个完整间隔之后
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn start(cache: Arc<UrlCache>, period: Duration) -> Self {
        let first_tick = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let removed = cache.clear_expired();
                if removed > 0 {
                    debug!(removed, remaining = cache.len(), "swept expired url cache entries");
                }
            }
        });

        info!(period_secs = period.as_secs(), "url cache sweeper started");
        Self {
            handle: Mutex::new(Some(handle)),
        }
    }

    /// 停止定时清理任务，重复调用无副作用
    pub fn stop(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(handle) = handle {
            handle.abort();
            info!("url cache sweeper stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_unread_expired_entries() {
        let cache = Arc::new(UrlCache::new(Duration::from_secs(60)));
        let sweeper = CacheSweeper::start(cache.clone(), Duration::from_secs(100));

        cache.set("never-read-again", "sig");
        assert_eq!(cache.len(), 1);

        // 条目已过期但清理尚未触发
        advance(Duration::from_secs(70)).await;
        tokio::task::yield_now().await;
        assert_eq!(cache.len(), 1);

        advance(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;
        assert_eq!(cache.len(), 0);

        sweeper.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stop_cancels_task() {
        let cache = Arc::new(UrlCache::new(Duration::from_secs(10)));
        let sweeper = CacheSweeper::start(cache.clone(), Duration::from_secs(20));
        assert!(sweeper.is_running());

        sweeper.stop();
        sweeper.stop();
        assert!(!sweeper.is_running());

        cache.set("k", "sig");
        advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        // 任务已取消，过期条目仍留在存储中
        assert_eq!(cache.len(), 1);
    }
}
