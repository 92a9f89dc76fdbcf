use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 分类精确过滤与 DISTINCT 枚举
        manager
            .create_index(
                Index::create()
                    .name("idx_wallpaper_category")
                    .table(Wallpaper::Table)
                    .col(Wallpaper::Category)
                    .to_owned(),
            )
            .await?;

        // 列表排序：uploaded_at DESC, id ASC
        manager
            .create_index(
                Index::create()
                    .name("idx_wallpaper_uploaded_at_id")
                    .table(Wallpaper::Table)
                    .col((Wallpaper::UploadedAt, IndexOrder::Desc))
                    .col(Wallpaper::Id)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_wallpaper_uploaded_at_id").table(Wallpaper::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_wallpaper_category").table(Wallpaper::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Wallpaper {
    Table,
    Id,
    Category,
    UploadedAt,
}
