//! 过期数据清理
//!
//! 周期性删除过期的跳转历史和 presence 窗口外的在线会话。
//! 读路径本身把过期行当作不存在，这里只是把垃圾行真正删掉；
//! 同样的动作也通过 /api/cleanup 暴露给外部 cron 手动触发。

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::storage::SeaOrmStorage;

/// 一次清理的结果
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupOutcome {
    pub removed_sessions: u64,
    pub removed_history: u64,
}

#[derive(Clone)]
pub struct CleanupService {
    storage: Arc<SeaOrmStorage>,
    session_ttl_minutes: i64,
    interval: std::time::Duration,
}

impl CleanupService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        session_ttl_minutes: i64,
        interval: std::time::Duration,
    ) -> Self {
        Self {
            storage,
            session_ttl_minutes,
            interval,
        }
    }

    /// 执行一次清理，失败只记日志（best-effort）
    pub async fn run_once(&self) -> CleanupOutcome {
        let now = Utc::now();
        let mut outcome = CleanupOutcome::default();

        match self.storage.delete_expired_history(now).await {
            Ok(removed) => outcome.removed_history = removed,
            Err(e) => warn!("Expired history cleanup failed: {}", e),
        }

        let cutoff = now - Duration::minutes(self.session_ttl_minutes);
        match self.storage.purge_stale_sessions(cutoff).await {
            Ok(removed) => outcome.removed_sessions = removed,
            Err(e) => warn!("Stale session cleanup failed: {}", e),
        }

        if outcome.removed_history > 0 || outcome.removed_sessions > 0 {
            debug!(
                "Cleanup removed {} history rows, {} sessions",
                outcome.removed_history, outcome.removed_sessions
            );
        }

        outcome
    }

    /// 后台清理循环（作为异步任务运行）
    pub async fn start_background_task(&self) {
        loop {
            sleep(self.interval).await;
            self.run_once().await;
        }
    }
}
