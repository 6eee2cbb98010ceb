use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // daily_stats 表：(link_slug, date) 复合主键，计数只增不减
        manager
            .create_table(
                Table::create()
                    .table(DailyStat::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DailyStat::LinkSlug).string().not_null())
                    .col(ColumnDef::new(DailyStat::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyStat::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(DailyStat::LinkSlug)
                            .col(DailyStat::Date),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_stats_date")
                    .table(DailyStat::Table)
                    .col(DailyStat::Date)
                    .to_owned(),
            )
            .await?;

        // online_sessions 表：在线人数近似值，30 分钟无心跳视为离线
        manager
            .create_table(
                Table::create()
                    .table(OnlineSession::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OnlineSession::LinkSlug).string().not_null())
                    .col(ColumnDef::new(OnlineSession::SessionId).string().not_null())
                    .col(
                        ColumnDef::new(OnlineSession::LastActive)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(OnlineSession::LinkSlug)
                            .col(OnlineSession::SessionId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_online_sessions_last_active")
                    .table(OnlineSession::Table)
                    .col(OnlineSession::LastActive)
                    .to_owned(),
            )
            .await?;

        // redirect_history 表：按来源地址限流，到期即视为不存在
        manager
            .create_table(
                Table::create()
                    .table(RedirectHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RedirectHistory::Address)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RedirectHistory::RedirectCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RedirectHistory::LastRedirectUrl)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RedirectHistory::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_redirect_history_expires_at")
                    .table(RedirectHistory::Table)
                    .col(RedirectHistory::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RedirectHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OnlineSession::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyStat::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyStat {
    #[sea_orm(iden = "daily_stats")]
    Table,
    LinkSlug,
    Date,
    Views,
}

#[derive(DeriveIden)]
enum OnlineSession {
    #[sea_orm(iden = "online_sessions")]
    Table,
    LinkSlug,
    SessionId,
    LastActive,
}

#[derive(DeriveIden)]
enum RedirectHistory {
    #[sea_orm(iden = "redirect_history")]
    Table,
    Address,
    RedirectCount,
    LastRedirectUrl,
    ExpiresAt,
}
