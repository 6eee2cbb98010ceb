use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // links 表：slug 为主键，创建后不可变
        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Link::Slug)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Link::AccountId).string().not_null())
                    .col(ColumnDef::new(Link::VideoUrl).text().not_null())
                    .col(ColumnDef::new(Link::DestinationUrl).text().null())
                    .col(
                        ColumnDef::new(Link::RedirectEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Link::TelegramUrl).text().null())
                    .col(ColumnDef::new(Link::WebUrl).text().null())
                    .col(ColumnDef::new(Link::LuckyEnabled).boolean().null())
                    .col(ColumnDef::new(Link::LuckyPercentage).integer().null())
                    .col(ColumnDef::new(Link::LuckyMode).string().null())
                    .col(
                        ColumnDef::new(Link::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::UpdatedAt)
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
                    .name("idx_links_account")
                    .table(Link::Table)
                    .col(Link::AccountId)
                    .to_owned(),
            )
            .await?;

        // global_settings 表：每个账号一行，upsert 维护
        manager
            .create_table(
                Table::create()
                    .table(GlobalSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GlobalSettings::AccountId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GlobalSettings::TelegramUrl).text().null())
                    .col(ColumnDef::new(GlobalSettings::WebUrl).text().null())
                    .col(
                        ColumnDef::new(GlobalSettings::LuckyEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GlobalSettings::LuckyPercentage)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(GlobalSettings::LuckyMode)
                            .string()
                            .not_null()
                            .default("random"),
                    )
                    .col(
                        ColumnDef::new(GlobalSettings::TimedEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GlobalSettings::TimedDelaySecs)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(GlobalSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // redirect_urls 表：lucky / smart / 播放结束共用的目标池
        manager
            .create_table(
                Table::create()
                    .table(RedirectUrl::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RedirectUrl::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RedirectUrl::AccountId).string().not_null())
                    .col(ColumnDef::new(RedirectUrl::Url).text().not_null())
                    .col(
                        ColumnDef::new(RedirectUrl::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RedirectUrl::CreatedAt)
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
                    .name("idx_redirect_urls_account_enabled")
                    .table(RedirectUrl::Table)
                    .col(RedirectUrl::AccountId)
                    .col(RedirectUrl::Enabled)
                    .to_owned(),
            )
            .await?;

        // timed_redirect_urls 表：倒计时跳转专用，独立生命周期
        manager
            .create_table(
                Table::create()
                    .table(TimedRedirectUrl::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimedRedirectUrl::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TimedRedirectUrl::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimedRedirectUrl::Url).text().not_null())
                    .col(
                        ColumnDef::new(TimedRedirectUrl::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TimedRedirectUrl::CreatedAt)
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
                    .name("idx_timed_redirect_urls_account_enabled")
                    .table(TimedRedirectUrl::Table)
                    .col(TimedRedirectUrl::AccountId)
                    .col(TimedRedirectUrl::Enabled)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TimedRedirectUrl::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RedirectUrl::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GlobalSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Link {
    #[sea_orm(iden = "links")]
    Table,
    Slug,
    AccountId,
    VideoUrl,
    DestinationUrl,
    RedirectEnabled,
    TelegramUrl,
    WebUrl,
    LuckyEnabled,
    LuckyPercentage,
    LuckyMode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GlobalSettings {
    #[sea_orm(iden = "global_settings")]
    Table,
    AccountId,
    TelegramUrl,
    WebUrl,
    LuckyEnabled,
    LuckyPercentage,
    LuckyMode,
    TimedEnabled,
    TimedDelaySecs,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RedirectUrl {
    #[sea_orm(iden = "redirect_urls")]
    Table,
    Id,
    AccountId,
    Url,
    Enabled,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TimedRedirectUrl {
    #[sea_orm(iden = "timed_redirect_urls")]
    Table,
    Id,
    AccountId,
    Url,
    Enabled,
    CreatedAt,
}
