use sea_orm::sea_query::{Expr, Order};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::wallpaper::domain::{NewWallpaper, Wallpaper};
use crate::wallpaper::query::WallpaperFilter;
use crate::wallpaper::repository::WallpaperRepository;
use models::wallpaper::{Column, Entity};

pub struct SeaOrmWallpaperRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmWallpaperRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

/// Translate the filter into a SQL condition. Postgres treats `\` as the
/// default LIKE escape, matching `WallpaperFilter::like_pattern`.
fn condition(filter: &WallpaperFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(category) = filter.category() {
        cond = cond.add(Column::Category.eq(category));
    }
    if let Some(pattern) = filter.like_pattern() {
        cond = cond.add(
            Condition::any()
                .add(Expr::cust_with_values(r#""title" ILIKE $1"#, [pattern.clone()]))
                .add(Expr::cust_with_values(r#""description" ILIKE $1"#, [pattern.clone()]))
                .add(Expr::cust_with_values(
                    r#"EXISTS (SELECT 1 FROM unnest("tags") AS t(tag) WHERE t.tag ILIKE $1)"#,
                    [pattern],
                )),
        );
    }
    cond
}

#[async_trait::async_trait]
impl WallpaperRepository for SeaOrmWallpaperRepository {
    async fn find(&self, filter: &WallpaperFilter, offset: u64, limit: u64) -> Result<Vec<Wallpaper>, ServiceError> {
        let rows = Entity::find()
            .filter(condition(filter))
            .order_by(Column::UploadedAt, Order::Desc)
            .order_by(Column::Id, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(ServiceError::db)?;
        Ok(rows.into_iter().map(Wallpaper::from).collect())
    }

    async fn count_matching(&self, filter: &WallpaperFilter) -> Result<u64, ServiceError> {
        Entity::find()
            .filter(condition(filter))
            .count(&self.db)
            .await
            .map_err(ServiceError::db)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Wallpaper>, ServiceError> {
        let row = Entity::find_by_id(id).one(&self.db).await.map_err(ServiceError::db)?;
        Ok(row.map(Wallpaper::from))
    }

    async fn insert(&self, record: NewWallpaper) -> Result<Wallpaper, ServiceError> {
        let created = models::wallpaper::create(&self.db, record.into()).await?;
        Ok(created.into())
    }

    async fn increment_downloads(&self, id: Uuid, delta: i64) -> Result<Option<Wallpaper>, ServiceError> {
        let updated = models::wallpaper::increment_downloads(&self.db, id, delta).await?;
        Ok(updated.map(Wallpaper::from))
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(models::wallpaper::distinct_categories(&self.db).await?)
    }
}
