use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{IntoParams, Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperDoc {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub resolution: String,
    pub image_url: String,
    pub downloads: i64,
    #[schema(format = DateTime)]
    pub uploaded_at: String,
    pub user_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperPageDoc {
    pub wallpapers: Vec<WallpaperDoc>,
    pub total_pages: u64,
    pub current_page: u64,
}

#[derive(ToSchema)]
pub struct ErrorBodyDoc {
    pub error: String,
    pub message: Option<String>,
    pub code: Option<u16>,
}

#[derive(ToSchema)]
pub struct UploadFormDoc {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    /// Comma-separated
    pub tags: Option<String>,
    pub resolution: String,
    /// jpeg, jpg, png or webp
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Listing query; invalid numbers fall back to page 1, limit 12.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQueryDoc {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// `all` or empty disables the filter
    pub category: Option<String>,
    pub search: Option<String>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::wallpapers::list,
        crate::routes::wallpapers::categories,
        crate::routes::wallpapers::get,
        crate::routes::wallpapers::upload,
        crate::routes::wallpapers::download,
    ),
    components(
        schemas(
            HealthResponse,
            WallpaperDoc,
            WallpaperPageDoc,
            ErrorBodyDoc,
            UploadFormDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "wallpapers")
    )
)]
pub struct ApiDoc;
