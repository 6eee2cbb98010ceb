//! 浏览计数管理器
//!
//! 负责收集和刷新浏览计数，支持：
//! - 高并发计数（使用 DashMap）
//! - 定时刷盘到存储后端
//! - 阈值触发刷盘
//! - 刷盘失败时计数恢复回缓冲区

use chrono::Utc;
use dashmap::DashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tracing::{debug, trace, warn};

use super::{ViewKey, ViewSink};

/// 浏览计数缓冲区，封装所有可变状态
struct ViewBuffer {
    /// (slug, 日期) → 未刷盘计数
    data: DashMap<ViewKey, usize>,
    /// 缓冲区中的总计数（用于阈值判断）
    total_views: AtomicUsize,
    /// 刷盘锁，防止并发刷盘
    flush_lock: Mutex<()>,
    /// 是否有 flush 任务待处理（防止重复 spawn）
    flush_pending: AtomicBool,
}

impl ViewBuffer {
    fn new() -> Self {
        Self {
            data: DashMap::new(),
            total_views: AtomicUsize::new(0),
            flush_lock: Mutex::new(()),
            flush_pending: AtomicBool::new(false),
        }
    }

    /// 增加一条浏览计数
    fn increment(&self, key: ViewKey) -> usize {
        self.data.entry(key).and_modify(|v| *v += 1).or_insert(1);
        self.total_views.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 收集所有更新并清空缓冲区（逐个 remove 避免竞态）
    fn drain(&self) -> Vec<(ViewKey, usize)> {
        // 1. 收集所有 key（snapshot）
        let keys: Vec<ViewKey> = self.data.iter().map(|r| r.key().clone()).collect();

        // 2. 逐个 remove（只删除 snapshot 中的 key，不影响窗口期新增）
        let mut updates = Vec::with_capacity(keys.len());
        let mut total_removed = 0;
        for key in keys {
            if let Some((k, v)) = self.data.remove(&key) {
                total_removed += v;
                updates.push((k, v));
            }
        }

        // 3. 更新总计数
        if total_removed > 0 {
            self.total_views
                .fetch_update(Ordering::Release, Ordering::Relaxed, |current| {
                    Some(current.saturating_sub(total_removed))
                })
                .ok();
        }

        updates
    }

    /// 恢复数据到缓冲区（用于刷盘失败时的恢复）
    fn restore(&self, updates: Vec<(ViewKey, usize)>) {
        let mut restored_total = 0;
        for (k, v) in updates {
            *self.data.entry(k).or_insert(0) += v;
            restored_total += v;
        }
        self.total_views.fetch_add(restored_total, Ordering::Relaxed);
    }

    /// 获取当前缓冲区总计数
    fn total(&self) -> usize {
        self.total_views.load(Ordering::Relaxed)
    }
}

/// 浏览计数管理器
///
/// 状态完全封装在结构体内部，便于测试和多实例使用。
#[derive(Clone)]
pub struct ViewManager {
    /// 计数缓冲区（共享所有权）
    buffer: Arc<ViewBuffer>,
    /// 存储后端
    sink: Arc<dyn ViewSink>,
    /// 刷盘间隔
    flush_interval: Duration,
    /// 触发刷盘的最大计数
    max_views_before_flush: usize,
}

impl ViewManager {
    pub fn new(
        sink: Arc<dyn ViewSink>,
        flush_interval: Duration,
        max_views_before_flush: usize,
    ) -> Self {
        Self {
            buffer: Arc::new(ViewBuffer::new()),
            sink,
            flush_interval,
            max_views_before_flush,
        }
    }

    /// 记录一次浏览（线程安全，无锁）
    ///
    /// 日期在计数当时取 UTC 当天，跨午夜的访问落到各自的日期键。
    pub fn increment(&self, slug: &str) {
        let key = (slug.to_string(), Utc::now().date_naive());
        let current_size = self.buffer.increment(key);
        trace!("ViewManager: Current buffer size: {}", current_size);

        // 检查是否达到阈值，尝试触发刷盘
        if current_size >= self.max_views_before_flush {
            // 使用 compare_exchange 防止任务风暴：
            // 只有成功将 flush_pending 从 false 设为 true 的线程才 spawn
            if self
                .buffer
                .flush_pending
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                let buffer = Arc::clone(&self.buffer);
                let sink = Arc::clone(&self.sink);
                tokio::spawn(async move {
                    if let Ok(_guard) = buffer.flush_lock.try_lock() {
                        Self::flush_buffer(&buffer, &sink).await;
                    } else {
                        trace!("ViewManager: flush already in progress, skipping");
                    }
                    // 无论成功与否都重置标志，允许下次触发
                    buffer.flush_pending.store(false, Ordering::Release);
                });
            }
        }
    }

    /// 启动后台刷盘任务（作为异步方法运行）
    pub async fn start_background_task(&self) {
        loop {
            sleep(self.flush_interval).await;

            debug!("ViewManager: Triggering scheduled flush");
            if let Ok(_guard) = self.buffer.flush_lock.try_lock() {
                Self::flush_buffer(&self.buffer, &self.sink).await;
            } else {
                trace!("ViewManager: flush already in progress, skipping scheduled flush");
            }
        }
    }

    /// 手动触发刷盘（阻塞直到完成）
    pub async fn flush(&self) {
        debug!("ViewManager: Manual flush triggered");
        let _guard = self.buffer.flush_lock.lock().await;
        Self::flush_buffer(&self.buffer, &self.sink).await;
    }

    /// 执行实际的刷盘操作
    async fn flush_buffer(buffer: &ViewBuffer, sink: &Arc<dyn ViewSink>) {
        let updates = buffer.drain();

        if updates.is_empty() {
            trace!("ViewManager: No views to flush");
            return;
        }

        let count = updates.len();
        match sink.flush_views(updates.clone()).await {
            Ok(_) => {
                debug!("ViewManager: Successfully flushed {} entries", count);
            }
            Err(e) => {
                // 刷盘失败，恢复数据到 buffer
                buffer.restore(updates);
                warn!(
                    "ViewManager: flush_views failed: {}, {} entries restored to buffer",
                    e, count
                );
            }
        }
    }

    /// 获取当前缓冲区总计数（用于监控）
    pub fn buffer_size(&self) -> usize {
        self.buffer.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct MockSink {
        flushed: std::sync::Mutex<Vec<(ViewKey, usize)>>,
        fail: AtomicBool,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                flushed: std::sync::Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            }
        }

        fn get_flushed(&self) -> Vec<(ViewKey, usize)> {
            self.flushed.lock().unwrap().clone()
        }

        fn total_views(&self) -> usize {
            self.flushed.lock().unwrap().iter().map(|(_, v)| v).sum()
        }
    }

    #[async_trait]
    impl ViewSink for MockSink {
        async fn flush_views(&self, updates: Vec<(ViewKey, usize)>) -> anyhow::Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("sink unavailable");
            }
            self.flushed.lock().unwrap().extend(updates);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_increment_and_flush() {
        let sink = Arc::new(MockSink::new());
        let manager = ViewManager::new(
            Arc::clone(&sink) as Arc<dyn ViewSink>,
            Duration::from_secs(60),
            1000,
        );

        manager.increment("slug1");
        manager.increment("slug1");
        manager.increment("slug2");

        // buffer_size() 返回总计数，不是唯一 key 数量
        assert_eq!(manager.buffer_size(), 3);

        manager.flush().await;

        assert_eq!(manager.buffer_size(), 0);
        let flushed = sink.get_flushed();
        assert_eq!(flushed.len(), 2); // 2 个唯一 key
        assert_eq!(sink.total_views(), 3);
    }

    #[tokio::test]
    async fn test_failed_flush_restores_counts() {
        let sink = Arc::new(MockSink::new());
        let manager = ViewManager::new(
            Arc::clone(&sink) as Arc<dyn ViewSink>,
            Duration::from_secs(60),
            1000,
        );

        manager.increment("slug1");
        manager.increment("slug1");

        sink.fail.store(true, Ordering::SeqCst);
        manager.flush().await;

        // 刷盘失败，计数留在缓冲区
        assert_eq!(manager.buffer_size(), 2);
        assert!(sink.get_flushed().is_empty());

        sink.fail.store(false, Ordering::SeqCst);
        manager.flush().await;

        assert_eq!(manager.buffer_size(), 0);
        assert_eq!(sink.total_views(), 2);
    }

    /// 并发 increment 不丢计数
    #[tokio::test]
    async fn test_concurrent_increment() {
        let sink = Arc::new(MockSink::new());
        let manager = Arc::new(ViewManager::new(
            Arc::clone(&sink) as Arc<dyn ViewSink>,
            Duration::from_secs(60),
            100000, // 高阈值，避免自动刷盘
        ));

        const NUM_TASKS: usize = 10;
        const INCREMENTS_PER_TASK: usize = 1000;

        let mut handles = vec![];
        for _ in 0..NUM_TASKS {
            let mgr = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                for _ in 0..INCREMENTS_PER_TASK {
                    mgr.increment("shared_slug");
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(manager.buffer_size(), NUM_TASKS * INCREMENTS_PER_TASK);

        manager.flush().await;

        assert_eq!(sink.total_views(), NUM_TASKS * INCREMENTS_PER_TASK);
    }

    /// 并发 increment + flush 交错不丢数据
    #[tokio::test]
    async fn test_concurrent_increment_and_drain() {
        let sink = Arc::new(MockSink::new());
        let manager = Arc::new(ViewManager::new(
            Arc::clone(&sink) as Arc<dyn ViewSink>,
            Duration::from_secs(60),
            100000,
        ));

        const NUM_TASKS: usize = 10;
        const INCREMENTS_PER_TASK: usize = 1000;
        const NUM_FLUSHES: usize = 5;

        let mut handles = vec![];
        for _ in 0..NUM_TASKS {
            let mgr = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                for _ in 0..INCREMENTS_PER_TASK {
                    mgr.increment("shared_slug");
                    if rand::random::<u8>() < 10 {
                        tokio::task::yield_now().await;
                    }
                }
            }));
        }

        let mgr_flush = Arc::clone(&manager);
        let flush_handle = tokio::spawn(async move {
            for _ in 0..NUM_FLUSHES {
                tokio::time::sleep(Duration::from_millis(10)).await;
                mgr_flush.flush().await;
            }
        });

        for handle in handles {
            handle.await.unwrap();
        }
        flush_handle.await.unwrap();

        // 最后一次 flush 确保所有数据都写入
        manager.flush().await;

        let flushed = sink.total_views();
        let remaining = manager.buffer_size();
        assert_eq!(
            flushed + remaining,
            NUM_TASKS * INCREMENTS_PER_TASK,
            "flushed={}, remaining={}",
            flushed,
            remaining
        );
    }
}
