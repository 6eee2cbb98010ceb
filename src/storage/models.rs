use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// lucky 跳转的决策模式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LuckyMode {
    /// 每次访问独立随机
    #[default]
    Random,
    /// 同一访客同一天结果固定
    Daily,
}

impl std::fmt::Display for LuckyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

/// lucky 跳转设置（账号级，或链接级完整覆盖）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuckySettings {
    pub enabled: bool,
    /// 命中比例，0..=100
    pub percentage: u8,
    pub mode: LuckyMode,
}

impl Default for LuckySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            percentage: 10,
            mode: LuckyMode::Random,
        }
    }
}

impl LuckySettings {
    pub fn new(enabled: bool, percentage: u8, mode: LuckyMode) -> Self {
        Self {
            enabled,
            percentage: percentage.min(100),
            mode,
        }
    }
}

/// 视频落地页链接
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub slug: String,
    pub account_id: String,
    pub video_url: String,
    pub destination_url: Option<String>,
    /// 是否参与 smart / 播放结束跳转
    pub redirect_enabled: bool,
    pub telegram_url: Option<String>,
    pub web_url: Option<String>,
    /// 链接级 lucky 覆盖。只有完整的一组才生效，否则回落到账号设置
    pub lucky_override: Option<LuckySettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// 选择本次访问生效的 lucky 设置：完整的链接级覆盖优先
    pub fn effective_lucky(&self, global: &GlobalSettings) -> LuckySettings {
        self.lucky_override.unwrap_or(global.lucky)
    }
}

/// 账号级全局设置，每账号一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub account_id: String,
    pub telegram_url: Option<String>,
    pub web_url: Option<String>,
    pub lucky: LuckySettings,
    pub timed_enabled: bool,
    pub timed_delay_secs: u32,
}

impl GlobalSettings {
    /// 账号还没保存过设置时的缺省行
    pub fn defaults_for(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            telegram_url: None,
            web_url: None,
            lucky: LuckySettings::default(),
            timed_enabled: false,
            timed_delay_secs: 5,
        }
    }
}

/// 按来源地址的跳转历史
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectHistory {
    pub address: String,
    pub redirect_count: u32,
    pub last_redirect_url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl RedirectHistory {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_lucky_mode_parses_case_insensitive() {
        assert_eq!(LuckyMode::from_str("daily").unwrap(), LuckyMode::Daily);
        assert_eq!(LuckyMode::from_str("Random").unwrap(), LuckyMode::Random);
        assert!(LuckyMode::from_str("weekly").is_err());
    }

    #[test]
    fn test_lucky_settings_clamps_percentage() {
        let settings = LuckySettings::new(true, 250, LuckyMode::Random);
        assert_eq!(settings.percentage, 100);
    }

    #[test]
    fn test_effective_lucky_prefers_complete_override() {
        let global = GlobalSettings {
            lucky: LuckySettings::new(true, 10, LuckyMode::Random),
            ..GlobalSettings::defaults_for("acct")
        };
        let mut link = Link {
            slug: "abcmp4".to_string(),
            account_id: "acct".to_string(),
            video_url: "https://cdn.example/v.webm".to_string(),
            destination_url: None,
            redirect_enabled: true,
            telegram_url: None,
            web_url: None,
            lucky_override: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(link.effective_lucky(&global).percentage, 10);

        link.lucky_override = Some(LuckySettings::new(true, 90, LuckyMode::Daily));
        let effective = link.effective_lucky(&global);
        assert_eq!(effective.percentage, 90);
        assert_eq!(effective.mode, LuckyMode::Daily);
    }
}
