//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations. 计数类写入一律走
//! 原子条件 upsert，杜绝应用层 read-then-write。

use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::info;

use super::converters::link_to_active_model;
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, VidgateError};
use crate::storage::models::{GlobalSettings, Link};

use migration::entities::{
    global_settings, link, online_session, redirect_history, redirect_url, timed_redirect_url,
};

impl SeaOrmStorage {
    /// 创建链接。slug 不可变，已存在即报错
    pub async fn create_link(&self, link: &Link) -> Result<()> {
        let db = &self.db;
        let active_model = link_to_active_model(link);

        let inserted = retry::with_retry(
            &format!("create_link({})", link.slug),
            self.retry_config,
            || async {
                link::Entity::insert(active_model.clone())
                    .on_conflict(
                        OnConflict::column(link::Column::Slug)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
            },
        )
        .await
        .map_err(|e| VidgateError::database_operation(format!("创建链接失败: {}", e)))?;

        if inserted == 0 {
            return Err(VidgateError::validation(format!(
                "slug 已存在: {}",
                link.slug
            )));
        }

        info!("Link created: {}", link.slug);
        Ok(())
    }

    /// Upsert 账号全局设置（首次保存 INSERT，之后 UPDATE，永不重复建行）
    pub async fn upsert_global_settings(&self, settings: &GlobalSettings) -> Result<()> {
        let db = &self.db;
        let active_model = global_settings::ActiveModel {
            account_id: Set(settings.account_id.clone()),
            telegram_url: Set(settings.telegram_url.clone()),
            web_url: Set(settings.web_url.clone()),
            lucky_enabled: Set(settings.lucky.enabled),
            lucky_percentage: Set(settings.lucky.percentage as i32),
            lucky_mode: Set(settings.lucky.mode.to_string()),
            timed_enabled: Set(settings.timed_enabled),
            timed_delay_secs: Set(settings.timed_delay_secs as i32),
            updated_at: Set(Utc::now()),
        };

        retry::with_retry(
            &format!("upsert_global_settings({})", settings.account_id),
            self.retry_config,
            || async {
                global_settings::Entity::insert(active_model.clone())
                    .on_conflict(
                        OnConflict::column(global_settings::Column::AccountId)
                            .update_columns([
                                global_settings::Column::TelegramUrl,
                                global_settings::Column::WebUrl,
                                global_settings::Column::LuckyEnabled,
                                global_settings::Column::LuckyPercentage,
                                global_settings::Column::LuckyMode,
                                global_settings::Column::TimedEnabled,
                                global_settings::Column::TimedDelaySecs,
                                global_settings::Column::UpdatedAt,
                            ])
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
            },
        )
        .await
        .map_err(|e| VidgateError::database_operation(format!("保存全局设置失败: {}", e)))?;

        Ok(())
    }

    /// 向主跳转目标池添加一条 URL
    pub async fn add_redirect_url(&self, account_id: &str, url: &str) -> Result<i64> {
        crate::utils::validate_url(url)?;

        let model = redirect_url::ActiveModel {
            account_id: Set(account_id.to_string()),
            url: Set(url.to_string()),
            enabled: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = redirect_url::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| VidgateError::database_operation(format!("添加跳转目标失败: {}", e)))?;

        Ok(result.last_insert_id)
    }

    /// 启用/停用主跳转目标池中的一条 URL
    pub async fn set_redirect_url_enabled(&self, id: i64, enabled: bool) -> Result<()> {
        let updated = redirect_url::Entity::update_many()
            .col_expr(redirect_url::Column::Enabled, Expr::value(enabled))
            .filter(redirect_url::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| VidgateError::database_operation(format!("更新跳转目标失败: {}", e)))?;

        if updated.rows_affected == 0 {
            return Err(VidgateError::not_found(format!("跳转目标不存在: {}", id)));
        }
        Ok(())
    }

    /// 向倒计时跳转目标池添加一条 URL
    pub async fn add_timed_redirect_url(&self, account_id: &str, url: &str) -> Result<i64> {
        crate::utils::validate_url(url)?;

        let model = timed_redirect_url::ActiveModel {
            account_id: Set(account_id.to_string()),
            url: Set(url.to_string()),
            enabled: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = timed_redirect_url::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| {
                VidgateError::database_operation(format!("添加倒计时目标失败: {}", e))
            })?;

        Ok(result.last_insert_id)
    }

    /// Upsert 在线会话，并发写同一 (link, session) 安全
    pub async fn upsert_online_session(
        &self,
        slug: &str,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let db = &self.db;
        let model = online_session::ActiveModel {
            link_slug: Set(slug.to_string()),
            session_id: Set(session_id.to_string()),
            last_active: Set(now),
        };

        retry::with_retry(
            &format!("upsert_online_session({})", slug),
            self.retry_config,
            || async {
                online_session::Entity::insert(model.clone())
                    .on_conflict(
                        OnConflict::columns([
                            online_session::Column::LinkSlug,
                            online_session::Column::SessionId,
                        ])
                        .update_column(online_session::Column::LastActive)
                        .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
            },
        )
        .await
        .map_err(|e| VidgateError::database_operation(format!("更新在线会话失败: {}", e)))?;

        Ok(())
    }

    /// 地址首次跳转的原子占位：INSERT ... ON CONFLICT DO NOTHING
    ///
    /// 返回 false 表示并发请求抢先建行，调用方放弃本次跳转。
    pub async fn claim_first_redirect(
        &self,
        address: &str,
        url: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<bool> {
        let db = &self.db;
        let model = redirect_history::ActiveModel {
            address: Set(address.to_string()),
            redirect_count: Set(1),
            last_redirect_url: Set(Some(url.to_string())),
            expires_at: Set(now + window),
        };

        let inserted = retry::with_retry(
            &format!("claim_first_redirect({})", address),
            self.retry_config,
            || async {
                redirect_history::Entity::insert(model.clone())
                    .on_conflict(
                        OnConflict::column(redirect_history::Column::Address)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
            },
        )
        .await
        .map_err(|e| VidgateError::database_operation(format!("写入跳转历史失败: {}", e)))?;

        Ok(inserted > 0)
    }

    /// 地址第二次跳转的原子占位：条件 UPDATE，计数必须仍为 1 且未过期
    ///
    /// 返回 false 表示已达上限、已过期或输给并发请求，调用方放弃本次跳转。
    pub async fn claim_second_redirect(
        &self,
        address: &str,
        url: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<bool> {
        let db = &self.db;
        let address_owned = address.to_string();
        let url_owned = url.to_string();
        let expires = now + window;

        let result = retry::with_retry(
            &format!("claim_second_redirect({})", address),
            self.retry_config,
            || async {
                redirect_history::Entity::update_many()
                    .col_expr(redirect_history::Column::RedirectCount, Expr::value(2))
                    .col_expr(
                        redirect_history::Column::LastRedirectUrl,
                        Expr::value(url_owned.clone()),
                    )
                    .col_expr(redirect_history::Column::ExpiresAt, Expr::value(expires))
                    .filter(redirect_history::Column::Address.eq(&address_owned))
                    .filter(redirect_history::Column::RedirectCount.eq(1))
                    .filter(redirect_history::Column::ExpiresAt.gt(now))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| VidgateError::database_operation(format!("更新跳转历史失败: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// 清理全部过期的跳转历史（best-effort housekeeping）
    pub async fn delete_expired_history(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = redirect_history::Entity::delete_many()
            .filter(redirect_history::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(|e| VidgateError::database_operation(format!("清理跳转历史失败: {}", e)))?;

        Ok(result.rows_affected)
    }

    /// 清理 presence 窗口之外的在线会话
    pub async fn purge_stale_sessions(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = online_session::Entity::delete_many()
            .filter(online_session::Column::LastActive.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(|e| VidgateError::database_operation(format!("清理在线会话失败: {}", e)))?;

        Ok(result.rows_affected)
    }
}
