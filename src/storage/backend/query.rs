//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.
//!
//! 读操作的失败策略与各自的调用方一致：落地页读取失败返回 None /
//! 空列表（功能视为关闭），跳转历史读取失败向上返回错误让评估器 fail closed。

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::error;

use super::converters::{model_to_history, model_to_link, model_to_settings};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, VidgateError};
use crate::storage::models::{GlobalSettings, Link, RedirectHistory};

use migration::entities::{
    daily_stat, global_settings, link, online_session, redirect_history, redirect_url,
    timed_redirect_url,
};

impl SeaOrmStorage {
    /// 按 slug 查询链接。后端错误时返回 None（访客侧宁可 404 不可 500）
    pub async fn get_link(&self, slug: &str) -> Option<Link> {
        let db = &self.db;
        let slug_owned = slug.to_string();

        let result = retry::with_retry(
            &format!("get_link({})", slug),
            self.retry_config,
            || async { link::Entity::find_by_id(&slug_owned).one(db).await },
        )
        .await;

        match result {
            Ok(Some(model)) => Some(model_to_link(model)),
            Ok(None) => None,
            Err(e) => {
                error!("查询链接失败（重试后仍失败）: {}", e);
                None
            }
        }
    }

    /// 查询账号全局设置，没有保存过则返回缺省行
    pub async fn get_global_settings(&self, account_id: &str) -> GlobalSettings {
        let db = &self.db;
        let account_owned = account_id.to_string();

        let result = retry::with_retry(
            &format!("get_global_settings({})", account_id),
            self.retry_config,
            || async {
                global_settings::Entity::find_by_id(&account_owned)
                    .one(db)
                    .await
            },
        )
        .await;

        match result {
            Ok(Some(model)) => model_to_settings(model),
            Ok(None) => GlobalSettings::defaults_for(account_id),
            Err(e) => {
                error!("查询全局设置失败: {}", e);
                GlobalSettings::defaults_for(account_id)
            }
        }
    }

    /// 查询账号启用的主跳转目标池。错误时返回空列表（功能视为关闭）
    pub async fn get_enabled_redirect_urls(&self, account_id: &str) -> Vec<String> {
        let db = &self.db;
        let account_owned = account_id.to_string();

        let result = retry::with_retry(
            &format!("get_enabled_redirect_urls({})", account_id),
            self.retry_config,
            || async {
                redirect_url::Entity::find()
                    .filter(redirect_url::Column::AccountId.eq(&account_owned))
                    .filter(redirect_url::Column::Enabled.eq(true))
                    .all(db)
                    .await
            },
        )
        .await;

        match result {
            Ok(models) => models.into_iter().map(|m| m.url).collect(),
            Err(e) => {
                error!("查询跳转目标池失败: {}", e);
                Vec::new()
            }
        }
    }

    /// 查询账号启用的倒计时跳转目标池
    pub async fn get_enabled_timed_redirect_urls(&self, account_id: &str) -> Vec<String> {
        let db = &self.db;
        let account_owned = account_id.to_string();

        let result = retry::with_retry(
            &format!("get_enabled_timed_redirect_urls({})", account_id),
            self.retry_config,
            || async {
                timed_redirect_url::Entity::find()
                    .filter(timed_redirect_url::Column::AccountId.eq(&account_owned))
                    .filter(timed_redirect_url::Column::Enabled.eq(true))
                    .all(db)
                    .await
            },
        )
        .await;

        match result {
            Ok(models) => models.into_iter().map(|m| m.url).collect(),
            Err(e) => {
                error!("查询倒计时目标池失败: {}", e);
                Vec::new()
            }
        }
    }

    /// 查询来源地址的跳转历史
    ///
    /// 先顺手清掉该地址已过期的行，过期即视为不存在。
    /// 错误向上返回，调用方 fail closed。
    pub async fn get_redirect_history(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RedirectHistory>> {
        let db = &self.db;
        let address_owned = address.to_string();

        retry::with_retry(
            &format!("purge_history({})", address),
            self.retry_config,
            || async {
                redirect_history::Entity::delete_many()
                    .filter(redirect_history::Column::Address.eq(&address_owned))
                    .filter(redirect_history::Column::ExpiresAt.lte(now))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| VidgateError::database_operation(format!("清理过期跳转历史失败: {}", e)))?;

        let model = retry::with_retry(
            &format!("get_redirect_history({})", address),
            self.retry_config,
            || async {
                redirect_history::Entity::find_by_id(&address_owned)
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| VidgateError::database_operation(format!("查询跳转历史失败: {}", e)))?;

        Ok(model.map(model_to_history))
    }

    /// 某链接当前在线人数（presence 窗口内的会话数，短 TTL 缓存）
    pub async fn count_online_sessions(&self, slug: &str, window_minutes: i64) -> u64 {
        if let Some(count) = self.online_count_cache.get(slug) {
            return count;
        }

        let cutoff = Utc::now() - Duration::minutes(window_minutes);
        let result = online_session::Entity::find()
            .filter(online_session::Column::LinkSlug.eq(slug))
            .filter(online_session::Column::LastActive.gte(cutoff))
            .count(&self.db)
            .await;

        match result {
            Ok(count) => {
                self.online_count_cache.insert(slug.to_string(), count);
                count
            }
            Err(e) => {
                error!("统计在线会话失败: {}", e);
                0
            }
        }
    }

    /// 某链接某天的浏览数（仪表盘/测试用）
    pub async fn get_daily_views(&self, slug: &str, date: NaiveDate) -> i64 {
        let result = daily_stat::Entity::find()
            .filter(daily_stat::Column::LinkSlug.eq(slug))
            .filter(daily_stat::Column::Date.eq(date))
            .one(&self.db)
            .await;

        match result {
            Ok(Some(model)) => model.views,
            Ok(None) => 0,
            Err(e) => {
                error!("查询每日浏览数失败: {}", e);
                0
            }
        }
    }

    /// 随机挑选一个其它链接的 slug（最新 100 条里均匀随机）
    pub async fn random_slug(&self, exclude: Option<&str>) -> Option<String> {
        let mut query = link::Entity::find()
            .select_only()
            .column(link::Column::Slug)
            .order_by_desc(link::Column::CreatedAt)
            .limit(100);

        if let Some(current) = exclude {
            query = query.filter(link::Column::Slug.ne(current));
        }

        let slugs: Vec<String> = match query.into_tuple().all(&self.db).await {
            Ok(slugs) => slugs,
            Err(e) => {
                error!("查询随机链接失败: {}", e);
                return None;
            }
        };

        if slugs.is_empty() {
            return None;
        }
        let index = rand::random_range(0..slugs.len());
        slugs.into_iter().nth(index)
    }
}
