use sea_orm::{
    entity::prelude::*, sea_query::Expr, ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallpaper")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub resolution: String,
    pub image_url: String,
    pub downloads: i64,
    pub uploaded_at: DateTimeWithTimeZone,
    pub user_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Insert payload; `uploaded_at` defaults to now, `downloads` to 0.
#[derive(Clone, Debug, Default)]
pub struct CreateWallpaper {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub resolution: String,
    pub image_url: String,
    pub downloads: i64,
    pub uploaded_at: Option<DateTimeWithTimeZone>,
    pub user_id: Option<String>,
}

/// Required text columns must be non-blank; returns the trimmed value.
pub fn validate_required(field: &str, value: &str) -> Result<String, errors::ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(errors::ModelError::Validation(format!("{field} required")));
    }
    Ok(v.to_string())
}

pub fn validate_tags(tags: &[String]) -> Result<(), errors::ModelError> {
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(errors::ModelError::Validation("tags must not contain empty entries".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: CreateWallpaper) -> Result<Model, errors::ModelError> {
    let title = validate_required("title", &input.title)?;
    let category = validate_required("category", &input.category)?;
    let resolution = validate_required("resolution", &input.resolution)?;
    let image_url = validate_required("image_url", &input.image_url)?;
    validate_tags(&input.tags)?;
    if input.downloads < 0 {
        return Err(errors::ModelError::Validation("downloads must be >= 0".into()));
    }

    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(input.description.filter(|d| !d.trim().is_empty())),
        category: Set(category),
        tags: Set(input.tags),
        resolution: Set(resolution),
        image_url: Set(image_url),
        downloads: Set(input.downloads),
        uploaded_at: Set(input.uploaded_at.unwrap_or_else(|| Utc::now().into())),
        user_id: Set(input.user_id),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Atomic `downloads = downloads + delta`; a single UPDATE ... RETURNING.
pub async fn increment_downloads(db: &DatabaseConnection, id: Uuid, delta: i64) -> Result<Option<Model>, errors::ModelError> {
    if delta < 0 {
        return Err(errors::ModelError::Validation("downloads can only increase".into()));
    }
    let rows = Entity::update_many()
        .col_expr(Column::Downloads, Expr::col(Column::Downloads).add(delta))
        .filter(Column::Id.eq(id))
        .exec_with_returning(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(rows.into_iter().next())
}

/// Distinct categories in ascending order.
pub async fn distinct_categories(db: &DatabaseConnection) -> Result<Vec<String>, errors::ModelError> {
    Entity::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .order_by_asc(Column::Category)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
