//! 倒计时跳转评估器
//!
//! 服务端只产出计划（延迟秒数 + 启用的目标池），倒计时在客户端跑，
//! 导航离开或更早的机制命中即取消。目标池与 lucky/smart 的池独立，
//! 与 smart 的地址上限无任何交互。

use super::pipeline::TimedPlan;

/// 评估倒计时跳转计划
///
/// 未启用或目标池为空都视为功能关闭；
/// 本次访问已有其它机制命中时由调用方直接跳过本评估器。
pub fn evaluate_timed(enabled: bool, delay_secs: u32, urls: &[String]) -> Option<TimedPlan> {
    if !enabled || urls.is_empty() {
        return None;
    }

    Some(TimedPlan {
        delay_secs,
        urls: urls.to_vec(),
    })
}
