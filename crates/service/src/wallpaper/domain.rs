use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted wallpaper as exposed to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallpaper {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub resolution: String,
    pub image_url: String,
    pub downloads: i64,
    pub uploaded_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Insert payload handed to the repository. The store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewWallpaper {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub resolution: String,
    pub image_url: String,
    pub downloads: i64,
    /// `None` means "now".
    pub uploaded_at: Option<DateTime<FixedOffset>>,
    pub user_id: Option<String>,
}

/// One page of listing results.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperPage {
    pub wallpapers: Vec<Wallpaper>,
    pub total_pages: u64,
    pub current_page: u64,
}

impl From<models::wallpaper::Model> for Wallpaper {
    fn from(m: models::wallpaper::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            category: m.category,
            tags: m.tags,
            resolution: m.resolution,
            image_url: m.image_url,
            downloads: m.downloads,
            uploaded_at: m.uploaded_at,
            user_id: m.user_id,
        }
    }
}

impl From<NewWallpaper> for models::wallpaper::CreateWallpaper {
    fn from(n: NewWallpaper) -> Self {
        Self {
            title: n.title,
            description: n.description,
            category: n.category,
            tags: n.tags,
            resolution: n.resolution,
            image_url: n.image_url,
            downloads: n.downloads,
            uploaded_at: n.uploaded_at,
            user_id: n.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let w = Wallpaper {
            id: Uuid::nil(),
            title: "Ocean Waves".into(),
            description: None,
            category: "Nature".into(),
            tags: vec!["ocean".into()],
            resolution: "1920x1080".into(),
            image_url: "https://example.com/o.jpg".into(),
            downloads: 3,
            uploaded_at: DateTime::parse_from_rfc3339("2023-04-05T00:00:00Z").unwrap(),
            user_id: Some("user_1".into()),
        };
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["imageUrl"], "https://example.com/o.jpg");
        assert_eq!(v["uploadedAt"], "2023-04-05T00:00:00Z");
        assert_eq!(v["userId"], "user_1");
        assert!(v.get("description").is_none());
    }

    #[test]
    fn page_uses_total_pages_key() {
        let p = WallpaperPage { wallpapers: vec![], total_pages: 0, current_page: 1 };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, serde_json::json!({"wallpapers": [], "totalPages": 0, "currentPage": 1}));
    }
}
