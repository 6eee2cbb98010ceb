//! ViewSink implementation for SeaOrmStorage
//!
//! 把浏览计数缓冲批量落到 daily_stats。每条 (slug, date) 走一次
//! 原子 upsert：INSERT ... ON CONFLICT DO UPDATE views = views + n，
//! 并发刷盘或并发访问同一链接都不会丢计数。

use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::EntityTrait;
use tracing::debug;

use super::{SeaOrmStorage, retry};
use crate::tracking::{ViewKey, ViewSink};
use crate::utils::is_valid_slug;

use migration::entities::daily_stat;

#[async_trait]
impl ViewSink for SeaOrmStorage {
    async fn flush_views(&self, updates: Vec<(ViewKey, usize)>) -> anyhow::Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        // 安全校验：slug 格式合法才允许进 SQL
        for ((slug, _), _) in &updates {
            if !is_valid_slug(slug) {
                anyhow::bail!(
                    "Invalid slug format detected: '{}' - refusing to execute SQL",
                    slug
                );
            }
        }

        let total_count = updates.len();
        let db = self.get_db();

        for ((slug, date), count) in &updates {
            let model = daily_stat::ActiveModel {
                link_slug: Set(slug.clone()),
                date: Set(*date),
                views: Set(*count as i64),
            };

            retry::with_retry("flush_views", self.retry_config, || async {
                daily_stat::Entity::insert(model.clone())
                    .on_conflict(
                        OnConflict::columns([
                            daily_stat::Column::LinkSlug,
                            daily_stat::Column::Date,
                        ])
                        .value(
                            daily_stat::Column::Views,
                            Expr::col((daily_stat::Entity, daily_stat::Column::Views))
                                .add(*count as i64),
                        )
                        .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
            })
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to upsert daily views (still failed after retries): {}",
                    e
                )
            })?;
        }

        debug!(
            "Daily views flushed to {} database ({} records)",
            self.backend_name().to_uppercase(),
            total_count
        );

        Ok(())
    }
}
