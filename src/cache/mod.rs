//! 页面读缓存
//!
//! 落地页每次访问都要读链接、账号设置和两个目标池，
//! 用 moka 短 TTL 缓存压掉这部分热读。查不到的 slug 也缓存
//! （负缓存），扫描型流量不会打穿到数据库。
//! 底层读操作出错时返回的 None/空列表同样会被缓存一个 TTL，
//! 宁可短暂提供陈旧或关闭态数据，也不向访客报错。

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::CacheConfig;
use crate::storage::{GlobalSettings, Link, SeaOrmStorage};

#[derive(Clone)]
pub struct PageCache {
    links: Cache<String, Option<Link>>,
    settings: Cache<String, GlobalSettings>,
    primary_urls: Cache<String, Vec<String>>,
    timed_urls: Cache<String, Vec<String>>,
}

impl PageCache {
    pub fn new(config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.default_ttl);
        let build = || {
            Cache::builder()
                .time_to_live(ttl)
                .max_capacity(config.max_capacity)
                .build()
        };

        Self {
            links: build(),
            settings: build(),
            primary_urls: build(),
            timed_urls: build(),
        }
    }

    pub async fn link(&self, storage: &Arc<SeaOrmStorage>, slug: &str) -> Option<Link> {
        let storage = Arc::clone(storage);
        let slug_owned = slug.to_string();
        self.links
            .get_with(slug.to_string(), async move {
                storage.get_link(&slug_owned).await
            })
            .await
    }

    pub async fn settings(
        &self,
        storage: &Arc<SeaOrmStorage>,
        account_id: &str,
    ) -> GlobalSettings {
        let storage = Arc::clone(storage);
        let account_owned = account_id.to_string();
        self.settings
            .get_with(account_id.to_string(), async move {
                storage.get_global_settings(&account_owned).await
            })
            .await
    }

    pub async fn primary_urls(&self, storage: &Arc<SeaOrmStorage>, account_id: &str) -> Vec<String> {
        let storage = Arc::clone(storage);
        let account_owned = account_id.to_string();
        self.primary_urls
            .get_with(account_id.to_string(), async move {
                storage.get_enabled_redirect_urls(&account_owned).await
            })
            .await
    }

    pub async fn timed_urls(&self, storage: &Arc<SeaOrmStorage>, account_id: &str) -> Vec<String> {
        let storage = Arc::clone(storage);
        let account_owned = account_id.to_string();
        self.timed_urls
            .get_with(account_id.to_string(), async move {
                storage.get_enabled_timed_redirect_urls(&account_owned).await
            })
            .await
    }

    /// 链接变更后失效对应缓存
    pub async fn invalidate_link(&self, slug: &str) {
        self.links.invalidate(slug).await;
    }

    /// 账号设置或目标池变更后失效对应缓存
    pub async fn invalidate_account(&self, account_id: &str) {
        self.settings.invalidate(account_id).await;
        self.primary_urls.invalidate(account_id).await;
        self.timed_urls.invalidate(account_id).await;
    }
}
