//! 在线会话实体（(link_slug, session_id) 复合主键）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "online_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub link_slug: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    pub last_active: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
