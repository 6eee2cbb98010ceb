//! Lucky 跳转评估器
//!
//! random 模式每次访问独立抽签；daily 模式对 (访客标识, UTC 日期)
//! 取稳定哈希，同一访客当天刷新结果不变，次日可能翻转。
//! 纯函数：除返回决策外无任何副作用，是否执行跳转、
//! 抑制其余机制由调用方负责。

use chrono::NaiveDate;
use xxhash_rust::xxh64::xxh64;

use crate::storage::models::{LuckyMode, LuckySettings};

use super::pick_url;

/// 评估 lucky 跳转
///
/// 目标池为空时无论开关和比例如何都不跳转。
pub fn evaluate_lucky(
    settings: &LuckySettings,
    urls: &[String],
    visitor_id: &str,
    today: NaiveDate,
) -> Option<String> {
    if !settings.enabled || urls.is_empty() {
        return None;
    }

    let hit = match settings.mode {
        LuckyMode::Random => rand::random_range(0..100u32) < settings.percentage as u32,
        LuckyMode::Daily => daily_bucket(visitor_id, today) < settings.percentage as u32,
    };

    if !hit {
        return None;
    }

    pick_url(urls).cloned()
}

/// 访客当天的稳定桶位 [0, 100)
///
/// 任意均匀的稳定哈希都可以，这里用 xxh64；
/// 不是兼容性约束，换哈希只影响切换当天的命中集合。
pub fn daily_bucket(visitor_id: &str, date: NaiveDate) -> u32 {
    let seed_input = format!("{}:{}", visitor_id, date.format("%Y-%m-%d"));
    (xxh64(seed_input.as_bytes(), 0) % 100) as u32
}
