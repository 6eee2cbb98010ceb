//! 访问编排服务
//!
//! 单次访问的完整路径：机器人闸门 → 访问记录（fire-and-forget）→
//! 跳转决策流水线。对外暴露落地页上下文、smart 评估、播放结束
//! 评估和随机链接四个读入口，全部失败软化：后端不可用时访客
//! 看到的是无跳转的正常内容，而不是错误页。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::PageCache;
use crate::config::get_config;
use crate::redirect::pipeline::{RedirectPipeline, VisitContext, VisitEvaluation};
use crate::redirect::smart::SmartRedirector;
use crate::storage::SeaOrmStorage;
use crate::tracking::VisitRecorder;

/// 落地页上下文，渲染层直接消费
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    pub slug: String,
    pub video_url: String,
    pub destination_url: Option<String>,
    /// 生效的按钮地址：链接级优先，账号默认兜底
    pub telegram_url: Option<String>,
    pub web_url: Option<String>,
    #[serde(flatten)]
    pub evaluation: VisitEvaluation,
}

/// 访问编排服务
#[derive(Clone)]
pub struct VisitService {
    storage: Arc<SeaOrmStorage>,
    cache: PageCache,
    recorder: VisitRecorder,
    pipeline: RedirectPipeline,
}

impl VisitService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        cache: PageCache,
        recorder: VisitRecorder,
    ) -> Self {
        let pipeline = RedirectPipeline::new(SmartRedirector::new(Arc::clone(&storage)));
        Self {
            storage,
            cache,
            recorder,
            pipeline,
        }
    }

    /// 落地页上下文 + 跳转评估
    ///
    /// 机器人拿到的是无跳转评估的上下文（页面照常渲染，供收录）。
    pub async fn page_context(&self, slug: &str, ctx: &VisitContext, is_bot: bool) -> Option<PageContext> {
        let link = self.cache.link(&self.storage, slug).await?;
        let settings = self.cache.settings(&self.storage, &link.account_id).await;

        let evaluation = if is_bot {
            debug!("Bot visit for {}, skipping redirect evaluation", slug);
            VisitEvaluation {
                redirect: None,
                timed: None,
            }
        } else {
            let primary_urls = self.cache.primary_urls(&self.storage, &link.account_id).await;
            let timed_urls = self.cache.timed_urls(&self.storage, &link.account_id).await;
            self.pipeline
                .evaluate_page_load(&link, &settings, &primary_urls, &timed_urls, ctx)
                .await
        };

        Some(PageContext {
            telegram_url: link.telegram_url.clone().or(settings.telegram_url),
            web_url: link.web_url.clone().or(settings.web_url),
            slug: link.slug,
            video_url: link.video_url,
            destination_url: link.destination_url,
            evaluation,
        })
    }

    /// 记录一次访问（浏览计数 + 在线会话）
    ///
    /// 机器人和未知 slug 都静默跳过，调用方一律返回成功。
    pub async fn track(&self, slug: &str, session_id: Option<&str>, is_bot: bool) {
        if is_bot {
            debug!("Bot visit for {}, skipping tracking", slug);
            return;
        }
        if self.cache.link(&self.storage, slug).await.is_none() {
            debug!("Track request for unknown slug: {}", slug);
            return;
        }

        self.recorder.record_visit(slug, session_id);
    }

    /// smart 跳转评估（保留的兼容入口）
    pub async fn smart_redirect(&self, slug: &str, address: Option<&str>) -> Option<String> {
        let link = self.cache.link(&self.storage, slug).await?;
        if !link.redirect_enabled {
            return None;
        }

        let address = address?;
        let urls = self.cache.primary_urls(&self.storage, &link.account_id).await;
        self.pipeline.smart().evaluate(address, &urls).await
    }

    /// 播放结束跳转评估
    pub async fn playback_ended(&self, slug: &str, already_redirected: bool) -> Option<String> {
        let link = self.cache.link(&self.storage, slug).await?;
        let urls = self.cache.primary_urls(&self.storage, &link.account_id).await;

        RedirectPipeline::evaluate_playback_end(&link, &urls, already_redirected)
            .map(|decision| decision.url)
    }

    /// 随机挑一个其它链接的 slug
    pub async fn random_slug(&self, exclude: Option<&str>) -> Option<String> {
        self.storage.random_slug(exclude).await
    }

    /// 某链接当前在线人数
    pub async fn online_count(&self, slug: &str) -> u64 {
        let window = get_config().tracking.session_ttl_minutes;
        self.storage.count_online_sessions(slug, window).await
    }

    pub fn recorder(&self) -> &VisitRecorder {
        &self.recorder
    }
}
