//! 实体模型与领域模型互转

use std::str::FromStr;

use sea_orm::ActiveValue::Set;

use migration::entities::{global_settings, link, redirect_history};

use crate::storage::models::{GlobalSettings, Link, LuckyMode, LuckySettings, RedirectHistory};

pub fn model_to_link(model: link::Model) -> Link {
    // 链接级覆盖三个字段必须齐全，模式字符串非法同样视为未覆盖
    let lucky_override = match (
        model.lucky_enabled,
        model.lucky_percentage,
        model.lucky_mode.as_deref().map(LuckyMode::from_str),
    ) {
        (Some(enabled), Some(percentage), Some(Ok(mode))) => Some(LuckySettings::new(
            enabled,
            percentage.clamp(0, 100) as u8,
            mode,
        )),
        _ => None,
    };

    Link {
        slug: model.slug,
        account_id: model.account_id,
        video_url: model.video_url,
        destination_url: model.destination_url,
        redirect_enabled: model.redirect_enabled,
        telegram_url: model.telegram_url,
        web_url: model.web_url,
        lucky_override,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn link_to_active_model(link: &Link) -> link::ActiveModel {
    link::ActiveModel {
        slug: Set(link.slug.clone()),
        account_id: Set(link.account_id.clone()),
        video_url: Set(link.video_url.clone()),
        destination_url: Set(link.destination_url.clone()),
        redirect_enabled: Set(link.redirect_enabled),
        telegram_url: Set(link.telegram_url.clone()),
        web_url: Set(link.web_url.clone()),
        lucky_enabled: Set(link.lucky_override.map(|o| o.enabled)),
        lucky_percentage: Set(link.lucky_override.map(|o| o.percentage as i32)),
        lucky_mode: Set(link.lucky_override.map(|o| o.mode.to_string())),
        created_at: Set(link.created_at),
        updated_at: Set(link.updated_at),
    }
}

pub fn model_to_settings(model: global_settings::Model) -> GlobalSettings {
    GlobalSettings {
        account_id: model.account_id,
        telegram_url: model.telegram_url,
        web_url: model.web_url,
        lucky: LuckySettings::new(
            model.lucky_enabled,
            model.lucky_percentage.clamp(0, 100) as u8,
            LuckyMode::from_str(&model.lucky_mode).unwrap_or_default(),
        ),
        timed_enabled: model.timed_enabled,
        timed_delay_secs: model.timed_delay_secs.max(0) as u32,
    }
}

pub fn model_to_history(model: redirect_history::Model) -> RedirectHistory {
    RedirectHistory {
        address: model.address,
        redirect_count: model.redirect_count.max(0) as u32,
        last_redirect_url: model.last_redirect_url,
        expires_at: model.expires_at,
    }
}
