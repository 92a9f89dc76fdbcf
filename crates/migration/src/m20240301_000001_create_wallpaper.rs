//! Create `wallpaper` table.
//! One row per uploaded wallpaper; `tags` is a text array, `downloads` only grows.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallpaper::Table)
                    .if_not_exists()
                    .col(uuid(Wallpaper::Id).primary_key())
                    .col(string_len(Wallpaper::Title, 256).not_null())
                    .col(text_null(Wallpaper::Description))
                    .col(string_len(Wallpaper::Category, 128).not_null())
                    .col(
                        ColumnDef::new(Wallpaper::Tags)
                            .array(ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("'{}'::text[]")),
                    )
                    .col(string_len(Wallpaper::Resolution, 32).not_null())
                    .col(string_len(Wallpaper::ImageUrl, 1024).not_null())
                    .col(big_integer(Wallpaper::Downloads).not_null().default(0))
                    .col(timestamp_with_time_zone(Wallpaper::UploadedAt).not_null())
                    .col(string_len_null(Wallpaper::UserId, 128))
                    .check(Expr::col(Wallpaper::Downloads).gte(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wallpaper::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Wallpaper {
    Table,
    Id,
    Title,
    Description,
    Category,
    Tags,
    Resolution,
    ImageUrl,
    Downloads,
    UploadedAt,
    UserId,
}
