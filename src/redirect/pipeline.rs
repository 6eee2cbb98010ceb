//! 跳转决策流水线
//!
//! 评估器按固定顺序排列，第一个命中的机制胜出，其余全部抑制：
//! lucky → smart → timed 计划。播放结束跳转是独立入口，只在
//! 页面加载阶段无机制命中（客户端回报 already_redirected=false）时生效。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::models::{GlobalSettings, Link};

use super::lucky::evaluate_lucky;
use super::smart::SmartRedirector;
use super::timed::evaluate_timed;
use super::pick_url;

/// 命中的跳转机制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    Lucky,
    Smart,
    PlaybackEnd,
}

/// 一次命中的跳转决策
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectDecision {
    pub url: String,
    pub mechanism: Mechanism,
}

/// 倒计时跳转计划，由客户端执行可取消的倒计时
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedPlan {
    pub delay_secs: u32,
    pub urls: Vec<String>,
}

/// 页面加载阶段的评估结果
///
/// `redirect` 有值时 `timed` 必为 None（互斥）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvaluation {
    pub redirect: Option<RedirectDecision>,
    pub timed: Option<TimedPlan>,
}

/// 访客上下文：smart 用来源地址，lucky daily 模式用访客标识
#[derive(Debug, Clone)]
pub struct VisitContext {
    pub address: Option<String>,
    pub visitor_id: String,
    pub today: NaiveDate,
}

/// 跳转决策流水线
#[derive(Clone)]
pub struct RedirectPipeline {
    smart: SmartRedirector,
}

impl RedirectPipeline {
    pub fn new(smart: SmartRedirector) -> Self {
        Self { smart }
    }

    pub fn smart(&self) -> &SmartRedirector {
        &self.smart
    }

    /// 页面加载阶段的完整评估
    pub async fn evaluate_page_load(
        &self,
        link: &Link,
        global: &GlobalSettings,
        primary_urls: &[String],
        timed_urls: &[String],
        ctx: &VisitContext,
    ) -> VisitEvaluation {
        // 1. lucky：按生效设置（链接级完整覆盖优先）抽签
        let lucky_settings = link.effective_lucky(global);
        if let Some(url) = evaluate_lucky(&lucky_settings, primary_urls, &ctx.visitor_id, ctx.today)
        {
            debug!("Lucky redirect fired for {}: {}", link.slug, url);
            return VisitEvaluation {
                redirect: Some(RedirectDecision {
                    url,
                    mechanism: Mechanism::Lucky,
                }),
                timed: None,
            };
        }

        // 2. smart：链接开启跳转且拿得到来源地址才评估
        if link.redirect_enabled
            && let Some(address) = ctx.address.as_deref()
            && let Some(url) = self.smart.evaluate(address, primary_urls).await
        {
            debug!("Smart redirect fired for {} ({}): {}", link.slug, address, url);
            return VisitEvaluation {
                redirect: Some(RedirectDecision {
                    url,
                    mechanism: Mechanism::Smart,
                }),
                timed: None,
            };
        }

        // 3. 前两者都未命中才下发倒计时计划
        let timed = evaluate_timed(global.timed_enabled, global.timed_delay_secs, timed_urls);

        VisitEvaluation {
            redirect: None,
            timed,
        }
    }

    /// 播放结束跳转（独立入口）
    ///
    /// 页面加载阶段已有机制命中（already_redirected）则保持互斥，不再跳转。
    pub fn evaluate_playback_end(
        link: &Link,
        primary_urls: &[String],
        already_redirected: bool,
    ) -> Option<RedirectDecision> {
        if already_redirected || !link.redirect_enabled || primary_urls.is_empty() {
            return None;
        }

        pick_url(primary_urls).map(|url| RedirectDecision {
            url: url.clone(),
            mechanism: Mechanism::PlaybackEnd,
        })
    }
}
