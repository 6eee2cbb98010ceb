//! 账号级全局设置实体（每账号一行，upsert 维护）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "global_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub telegram_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub web_url: Option<String>,
    pub lucky_enabled: bool,
    pub lucky_percentage: i32,
    pub lucky_mode: String,
    pub timed_enabled: bool,
    pub timed_delay_secs: i32,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
