//! Read-only data source used when the persistence gateway is unavailable.

use uuid::Uuid;

use super::catalog::sample_catalog;
use super::domain::{Wallpaper, WallpaperPage};
use super::query::WallpaperQuery;
use super::repository::listing_order;

pub trait ReadFallback: Send + Sync {
    fn list(&self, query: &WallpaperQuery) -> WallpaperPage;
    fn categories(&self) -> Vec<String>;
}

/// Serves the built-in sample catalog with stable ids.
pub struct StaticCatalog {
    items: Vec<Wallpaper>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        let items = sample_catalog()
            .into_iter()
            .enumerate()
            .map(|(i, n)| Wallpaper {
                id: Uuid::from_u128(i as u128 + 1),
                title: n.title,
                description: n.description,
                category: n.category,
                tags: n.tags,
                resolution: n.resolution,
                image_url: n.image_url,
                downloads: n.downloads,
                uploaded_at: n.uploaded_at.unwrap_or_else(|| chrono::Utc::now().fixed_offset()),
                user_id: None,
            })
            .collect();
        Self { items }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self { Self::new() }
}

impl ReadFallback for StaticCatalog {
    fn list(&self, query: &WallpaperQuery) -> WallpaperPage {
        let mut hits: Vec<&Wallpaper> = self.items.iter().filter(|w| query.filter().matches(w)).collect();
        hits.sort_by(|a, b| listing_order(a, b));
        let total = hits.len() as u64;
        let wallpapers = hits
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit()).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        WallpaperPage { wallpapers, total_pages: query.total_pages(total), current_page: query.page() }
    }

    fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self.items.iter().map(|w| w.category.clone()).collect();
        cats.sort();
        cats.dedup();
        cats
    }
}
