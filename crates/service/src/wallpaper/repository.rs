use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ServiceError;
use super::domain::{NewWallpaper, Wallpaper};
use super::query::WallpaperFilter;

/// Persistence gateway for wallpapers.
///
/// `find` returns records newest first, ties broken by ascending id.
#[async_trait]
pub trait WallpaperRepository: Send + Sync {
    async fn find(&self, filter: &WallpaperFilter, offset: u64, limit: u64) -> Result<Vec<Wallpaper>, ServiceError>;
    async fn count_matching(&self, filter: &WallpaperFilter) -> Result<u64, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Wallpaper>, ServiceError>;
    async fn insert(&self, record: NewWallpaper) -> Result<Wallpaper, ServiceError>;
    /// Atomically add `delta`; `None` when no such record.
    async fn increment_downloads(&self, id: Uuid, delta: i64) -> Result<Option<Wallpaper>, ServiceError>;
    /// Distinct categories, ascending.
    async fn distinct_categories(&self) -> Result<Vec<String>, ServiceError>;
}

/// Listing order shared by in-process implementations.
pub fn listing_order(a: &Wallpaper, b: &Wallpaper) -> std::cmp::Ordering {
    b.uploaded_at.cmp(&a.uploaded_at).then_with(|| a.id.cmp(&b.id))
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryWallpaperRepository {
        rows: Mutex<Vec<Wallpaper>>,
        inserts: AtomicUsize,
        unavailable: AtomicBool,
    }

    impl MemoryWallpaperRepository {
        /// Make every call fail with `StorageUnavailable`.
        pub fn set_unavailable(&self, down: bool) {
            self.unavailable.store(down, Ordering::SeqCst);
        }

        /// Number of successful inserts so far.
        pub fn insert_count(&self) -> usize {
            self.inserts.load(Ordering::SeqCst)
        }

        fn check(&self) -> Result<(), ServiceError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(ServiceError::StorageUnavailable("memory repository offline".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl WallpaperRepository for MemoryWallpaperRepository {
        async fn find(&self, filter: &WallpaperFilter, offset: u64, limit: u64) -> Result<Vec<Wallpaper>, ServiceError> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            let mut hits: Vec<Wallpaper> = rows.iter().filter(|w| filter.matches(w)).cloned().collect();
            hits.sort_by(listing_order);
            Ok(hits
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect())
        }

        async fn count_matching(&self, filter: &WallpaperFilter) -> Result<u64, ServiceError> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|w| filter.matches(w)).count() as u64)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Wallpaper>, ServiceError> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|w| w.id == id).cloned())
        }

        async fn insert(&self, record: NewWallpaper) -> Result<Wallpaper, ServiceError> {
            self.check()?;
            let w = Wallpaper {
                id: Uuid::new_v4(),
                title: record.title,
                description: record.description,
                category: record.category,
                tags: record.tags,
                resolution: record.resolution,
                image_url: record.image_url,
                downloads: record.downloads,
                uploaded_at: record.uploaded_at.unwrap_or_else(|| chrono::Utc::now().fixed_offset()),
                user_id: record.user_id,
            };
            self.rows.lock().unwrap().push(w.clone());
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok(w)
        }

        async fn increment_downloads(&self, id: Uuid, delta: i64) -> Result<Option<Wallpaper>, ServiceError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|w| w.id == id).map(|w| {
                w.downloads += delta;
                w.clone()
            }))
        }

        async fn distinct_categories(&self) -> Result<Vec<String>, ServiceError> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            let mut cats: Vec<String> = rows.iter().map(|w| w.category.clone()).collect();
            cats.sort();
            cats.dedup();
            Ok(cats)
        }
    }
}
