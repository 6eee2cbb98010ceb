//! Smart 跳转评估器
//!
//! 以来源地址为键的有状态机制：滚动窗口内最多 2 次跳转，
//! 第二次尽量换一个与上次不同的目标。状态显式建模为
//! Fresh → RedirectedOnce → Capped，由存储行 (count, expires_at) 推导，
//! 上限与过期策略集中在这一处。
//!
//! 写入走存储层的原子占位（INSERT ... DO NOTHING / 条件 UPDATE），
//! 同一地址的并发请求不会把计数推过上限；占位失败或后端出错
//! 一律 fail closed，访客直接看内容。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::storage::models::RedirectHistory;
use crate::storage::SeaOrmStorage;

use super::pick_url;

/// 滚动窗口长度：最近一次跳转后 5 分钟
pub const HISTORY_WINDOW_SECS: i64 = 300;

/// 窗口内单地址跳转上限
pub const MAX_REDIRECTS_PER_WINDOW: u32 = 2;

/// 来源地址在窗口内的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressState {
    /// 无历史或历史已过期
    Fresh,
    /// 已跳转一次，记录上次目标
    RedirectedOnce { last_url: Option<String> },
    /// 已达上限，窗口结束前不再跳转
    Capped,
}

impl AddressState {
    /// 由存储行推导状态；过期行等同于不存在
    pub fn from_history(history: Option<&RedirectHistory>, now: DateTime<Utc>) -> Self {
        match history {
            None => AddressState::Fresh,
            Some(h) if h.is_expired(now) => AddressState::Fresh,
            Some(h) if h.redirect_count >= MAX_REDIRECTS_PER_WINDOW => AddressState::Capped,
            Some(h) => AddressState::RedirectedOnce {
                last_url: h.last_redirect_url.clone(),
            },
        }
    }
}

/// 按状态挑选下一个跳转目标（纯函数）
///
/// 第二次跳转在目标池不止一条时避开上次的 URL。
pub fn choose_next_url(state: &AddressState, urls: &[String]) -> Option<String> {
    if urls.is_empty() {
        return None;
    }

    match state {
        AddressState::Capped => None,
        AddressState::Fresh => pick_url(urls).cloned(),
        AddressState::RedirectedOnce { last_url } => {
            let alternatives: Vec<String> = urls
                .iter()
                .filter(|u| Some(*u) != last_url.as_ref())
                .cloned()
                .collect();
            if alternatives.is_empty() {
                // 池里只有上次那一条，只能重复
                pick_url(urls).cloned()
            } else {
                pick_url(&alternatives)
            }
        }
    }
}

/// Smart 跳转服务
#[derive(Clone)]
pub struct SmartRedirector {
    storage: Arc<SeaOrmStorage>,
}

impl SmartRedirector {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 评估来源地址本次是否跳转，返回目标 URL
    ///
    /// 决策与占位两步：先由历史推导状态选目标，再原子占位。
    /// 占位失败（并发竞争/已达上限）或后端错误都返回 None。
    pub async fn evaluate(&self, address: &str, urls: &[String]) -> Option<String> {
        if address.is_empty() || urls.is_empty() {
            return None;
        }

        let now = Utc::now();
        let history = match self.storage.get_redirect_history(address, now).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Redirect history lookup failed, skipping redirect: {}", e);
                return None;
            }
        };

        let state = AddressState::from_history(history.as_ref(), now);
        let url = choose_next_url(&state, urls)?;
        let window = Duration::seconds(HISTORY_WINDOW_SECS);

        let claimed = match state {
            AddressState::Fresh => {
                self.storage
                    .claim_first_redirect(address, &url, now, window)
                    .await
            }
            AddressState::RedirectedOnce { .. } => {
                self.storage
                    .claim_second_redirect(address, &url, now, window)
                    .await
            }
            AddressState::Capped => return None,
        };

        match claimed {
            Ok(true) => Some(url),
            Ok(false) => None,
            Err(e) => {
                warn!("Redirect history claim failed, skipping redirect: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(count: u32, last: Option<&str>, expires_in_secs: i64) -> RedirectHistory {
        RedirectHistory {
            address: "203.0.113.9".to_string(),
            redirect_count: count,
            last_redirect_url: last.map(String::from),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_state_no_history_is_fresh() {
        assert_eq!(
            AddressState::from_history(None, Utc::now()),
            AddressState::Fresh
        );
    }

    #[test]
    fn test_state_expired_history_is_fresh() {
        let h = history(2, Some("https://a.example"), -1);
        assert_eq!(
            AddressState::from_history(Some(&h), Utc::now()),
            AddressState::Fresh
        );
    }

    #[test]
    fn test_state_count_one_is_redirected_once() {
        let h = history(1, Some("https://a.example"), 60);
        assert_eq!(
            AddressState::from_history(Some(&h), Utc::now()),
            AddressState::RedirectedOnce {
                last_url: Some("https://a.example".to_string())
            }
        );
    }

    #[test]
    fn test_state_count_two_is_capped() {
        let h = history(2, Some("https://a.example"), 60);
        assert_eq!(
            AddressState::from_history(Some(&h), Utc::now()),
            AddressState::Capped
        );
        // 超过 2 同样终态
        let h = history(5, None, 60);
        assert_eq!(
            AddressState::from_history(Some(&h), Utc::now()),
            AddressState::Capped
        );
    }

    #[test]
    fn test_choose_capped_never_yields() {
        assert!(choose_next_url(&AddressState::Capped, &urls(&["https://a.example"])).is_none());
    }

    #[test]
    fn test_choose_empty_pool_never_yields() {
        assert!(choose_next_url(&AddressState::Fresh, &[]).is_none());
    }

    #[test]
    fn test_second_redirect_prefers_different_url() {
        let state = AddressState::RedirectedOnce {
            last_url: Some("https://a.example".to_string()),
        };
        let pool = urls(&["https://a.example", "https://b.example"]);
        for _ in 0..50 {
            let chosen = choose_next_url(&state, &pool).unwrap();
            assert_eq!(chosen, "https://b.example");
        }
    }

    #[test]
    fn test_second_redirect_repeats_when_pool_has_one() {
        let state = AddressState::RedirectedOnce {
            last_url: Some("https://a.example".to_string()),
        };
        let pool = urls(&["https://a.example"]);
        assert_eq!(
            choose_next_url(&state, &pool).as_deref(),
            Some("https://a.example")
        );
    }
}
