//! 访问记录器
//!
//! 每次合格访问：浏览计数进缓冲区，在线会话后台 upsert。
//! 两个副作用互不影响，任一失败只记日志，永不阻塞访客响应。

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::storage::SeaOrmStorage;
use crate::tracking::ViewManager;

#[derive(Clone)]
pub struct VisitRecorder {
    views: ViewManager,
    storage: Arc<SeaOrmStorage>,
}

impl VisitRecorder {
    pub fn new(views: ViewManager, storage: Arc<SeaOrmStorage>) -> Self {
        Self { views, storage }
    }

    /// 记录一次访问（fire-and-forget）
    ///
    /// 会话标识由客户端持有并保证稳定（有界生命周期的 token），
    /// 这里按请求计数，不做进一步去重。
    pub fn record_visit(&self, slug: &str, session_id: Option<&str>) {
        self.views.increment(slug);

        if let Some(session_id) = session_id {
            let storage = Arc::clone(&self.storage);
            let slug = slug.to_string();
            let session_id = session_id.to_string();
            tokio::spawn(async move {
                if let Err(e) = storage
                    .upsert_online_session(&slug, &session_id, Utc::now())
                    .await
                {
                    warn!("Online session upsert failed (non-blocking): {}", e);
                }
            });
        }
    }

    /// 立即把缓冲区刷到存储（优雅停机用）
    pub async fn flush(&self) {
        self.views.flush().await;
    }

    pub fn views(&self) -> &ViewManager {
        &self.views
    }
}
