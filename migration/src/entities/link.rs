//! 视频落地页链接实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,
    pub account_id: String,
    #[sea_orm(column_type = "Text")]
    pub video_url: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub destination_url: Option<String>,
    pub redirect_enabled: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub telegram_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub web_url: Option<String>,
    /// 链接级 lucky 覆盖（三个字段要么全有要么全无）
    pub lucky_enabled: Option<bool>,
    pub lucky_percentage: Option<i32>,
    pub lucky_mode: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
