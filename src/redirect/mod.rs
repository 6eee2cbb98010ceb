//! Redirect decision subsystem
//!
//! 一次访问按固定顺序评估各跳转机制：lucky → smart → timed，
//! 任一机制命中后其余全部抑制；播放结束跳转是独立入口，
//! 仅在页面加载阶段没有任何机制命中时才生效。
//! 所有评估器都是 (设置, 目标池, 访客上下文) 的纯函数或
//! 围绕原子存储占位的薄封装，机器人流量在进入本模块前已被拦下。

pub mod bot;
pub mod lucky;
pub mod pipeline;
pub mod smart;
pub mod timed;

pub use bot::classify_bot;
pub use lucky::evaluate_lucky;
pub use pipeline::{RedirectDecision, RedirectPipeline, TimedPlan, VisitEvaluation};
pub use smart::{AddressState, SmartRedirector};
pub use timed::evaluate_timed;

use rand::seq::IndexedRandom;

/// 从目标池均匀随机取一条 URL
pub(crate) fn pick_url<'a>(urls: &'a [String]) -> Option<&'a String> {
    urls.choose(&mut rand::rng())
}
