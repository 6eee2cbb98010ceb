use async_trait::async_trait;

use super::ViewKey;

/// 浏览计数刷盘目标
///
/// 实现方必须保证同一 (slug, date) 的并发刷盘不丢计数
/// （原子 upsert，views = views + n）。
#[async_trait]
pub trait ViewSink: Send + Sync {
    async fn flush_views(&self, updates: Vec<(ViewKey, usize)>) -> anyhow::Result<()>;
}
