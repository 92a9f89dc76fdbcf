use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::identity::AuthContext;
use crate::media::MediaStore;
use super::catalog::sample_catalog;
use super::domain::{NewWallpaper, Wallpaper, WallpaperPage};
use super::fallback::ReadFallback;
use super::query::WallpaperQuery;
use super::repository::WallpaperRepository;
use super::upload::{UploadInput, UploadPolicy};

/// Wallpaper business service independent of web framework
pub struct WallpaperService {
    repo: Arc<dyn WallpaperRepository>,
    media: Arc<dyn MediaStore>,
    policy: UploadPolicy,
    fallback: Option<Arc<dyn ReadFallback>>,
}

impl WallpaperService {
    pub fn new(repo: Arc<dyn WallpaperRepository>, media: Arc<dyn MediaStore>) -> Self {
        Self { repo, media, policy: UploadPolicy::default(), fallback: None }
    }

    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Serve reads from `fallback` when the repository is unavailable.
    pub fn with_fallback(mut self, fallback: Arc<dyn ReadFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn policy(&self) -> UploadPolicy { self.policy }

    /// One page of wallpapers, newest first.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::WallpaperService;
    /// use service::media::mock::MemoryMediaStore;
    /// use service::wallpaper::query::{ListParams, WallpaperQuery};
    /// use service::wallpaper::repository::mock::MemoryWallpaperRepository;
    /// let svc = WallpaperService::new(Arc::new(MemoryWallpaperRepository::default()), Arc::new(MemoryMediaStore::default()));
    /// tokio_test::block_on(svc.seed_if_empty()).unwrap();
    /// let q = WallpaperQuery::parse(&ListParams { limit: Some("2".into()), ..Default::default() });
    /// let page = tokio_test::block_on(svc.list(&q)).unwrap();
    /// assert_eq!(page.wallpapers.len(), 2);
    /// assert_eq!(page.total_pages, 3);
    /// assert_eq!(page.wallpapers[0].title, "Abstract Art");
    /// ```
    #[instrument(skip(self, query), fields(page = query.page(), limit = query.limit(), category = ?query.filter().category()))]
    pub async fn list(&self, query: &WallpaperQuery) -> Result<WallpaperPage, ServiceError> {
        match self.list_from_store(query).await {
            Ok(page) => Ok(page),
            Err(ServiceError::StorageUnavailable(reason)) if self.fallback.is_some() => {
                warn!(event = "read_fallback", op = "list", %reason, "serving sample catalog");
                Ok(self.fallback.as_ref().map(|f| f.list(query)).unwrap_or_default())
            }
            Err(e) => Err(e),
        }
    }

    async fn list_from_store(&self, query: &WallpaperQuery) -> Result<WallpaperPage, ServiceError> {
        let total = self.repo.count_matching(query.filter()).await?;
        let wallpapers = if query.offset() >= total {
            Vec::new()
        } else {
            self.repo.find(query.filter(), query.offset(), query.limit()).await?
        };
        Ok(WallpaperPage { wallpapers, total_pages: query.total_pages(total), current_page: query.page() })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Wallpaper, ServiceError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("wallpaper"))
    }

    /// Distinct categories in use, ascending.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        match self.repo.distinct_categories().await {
            Ok(c) => Ok(c),
            Err(ServiceError::StorageUnavailable(reason)) if self.fallback.is_some() => {
                warn!(event = "read_fallback", op = "categories", %reason, "serving sample catalog");
                Ok(self.fallback.as_ref().map(|f| f.categories()).unwrap_or_default())
            }
            Err(e) => Err(e),
        }
    }

    /// Validate, store the image, then persist the record.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::WallpaperService;
    /// use service::identity::AuthContext;
    /// use service::media::mock::MemoryMediaStore;
    /// use service::wallpaper::repository::mock::MemoryWallpaperRepository;
    /// use service::wallpaper::upload::{UploadFile, UploadInput};
    /// let svc = WallpaperService::new(Arc::new(MemoryWallpaperRepository::default()), Arc::new(MemoryMediaStore::default()));
    /// let input = UploadInput {
    ///     title: Some("Aurora".into()),
    ///     category: Some("Nature".into()),
    ///     tags: Some("sky, night".into()),
    ///     resolution: Some("3840x2160".into()),
    ///     file: Some(UploadFile { file_name: "aurora.jpg".into(), content_type: Some("image/jpeg".into()), bytes: vec![0xFF, 0xD8] }),
    ///     ..Default::default()
    /// };
    /// let w = tokio_test::block_on(svc.upload(input, &AuthContext::authenticated("user_1"))).unwrap();
    /// assert_eq!(w.downloads, 0);
    /// assert_eq!(w.tags, vec!["sky", "night"]);
    /// assert_eq!(w.user_id.as_deref(), Some("user_1"));
    /// ```
    #[instrument(skip(self, input, auth), fields(user_id = ?auth.user_id()))]
    pub async fn upload(&self, input: UploadInput, auth: &AuthContext) -> Result<Wallpaper, ServiceError> {
        let v = self.policy.validate(input)?;
        let stored = self.media.store(&v.file).await?;

        let record = NewWallpaper {
            title: v.title,
            description: v.description,
            category: v.category,
            tags: v.tags,
            resolution: v.resolution,
            image_url: stored.url.clone(),
            downloads: 0,
            uploaded_at: None,
            user_id: auth.user_id().map(str::to_string),
        };
        match self.repo.insert(record).await {
            Ok(w) => {
                info!(event = "wallpaper_uploaded", id = %w.id, category = %w.category, bytes = v.file.bytes.len());
                Ok(w)
            }
            Err(e) => {
                error!(event = "orphaned_media", url = %stored.url, public_id = %stored.public_id, err = %e);
                Err(e)
            }
        }
    }

    /// Add one download; requires a verified caller.
    #[instrument(skip(self, auth))]
    pub async fn increment_download(&self, id: Uuid, auth: &AuthContext) -> Result<Wallpaper, ServiceError> {
        let subject = auth.require_subject()?;
        let w = self
            .repo
            .increment_downloads(id, 1)
            .await?
            .ok_or_else(|| ServiceError::not_found("wallpaper"))?;
        info!(event = "wallpaper_downloaded", id = %w.id, downloads = w.downloads, user_id = %subject.user_id);
        Ok(w)
    }

    /// Insert the sample catalog when the store is empty; returns rows inserted.
    #[instrument(skip(self))]
    pub async fn seed_if_empty(&self) -> Result<usize, ServiceError> {
        let existing = self.repo.count_matching(&Default::default()).await?;
        if existing > 0 {
            info!(event = "seed_skipped", existing, "store already has wallpapers");
            return Ok(0);
        }
        let samples = sample_catalog();
        let n = samples.len();
        for s in samples {
            self.repo.insert(s).await?;
        }
        info!(event = "seeded", count = n);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use crate::media::mock::MemoryMediaStore;
    use crate::wallpaper::fallback::StaticCatalog;
    use crate::wallpaper::query::ListParams;
    use crate::wallpaper::repository::mock::MemoryWallpaperRepository;
    use crate::wallpaper::upload::UploadFile;
    use chrono::{Duration, TimeZone, Utc};

    struct Fixture {
        repo: Arc<MemoryWallpaperRepository>,
        media: Arc<MemoryMediaStore>,
        svc: WallpaperService,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MemoryWallpaperRepository::default());
        let media = Arc::new(MemoryMediaStore::default());
        let svc = WallpaperService::new(repo.clone(), media.clone());
        Fixture { repo, media, svc }
    }

    fn record(title: &str, category: &str, days: i64) -> NewWallpaper {
        NewWallpaper {
            title: title.into(),
            description: None,
            category: category.into(),
            tags: vec![],
            resolution: "1920x1080".into(),
            image_url: format!("https://img.example/{title}.jpg"),
            downloads: 0,
            uploaded_at: Some((Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(days)).fixed_offset()),
            user_id: None,
        }
    }

    fn query(page: &str, limit: &str, category: Option<&str>, search: Option<&str>) -> WallpaperQuery {
        WallpaperQuery::parse(&ListParams {
            page: Some(page.into()),
            limit: Some(limit.into()),
            category: category.map(Into::into),
            search: search.map(Into::into),
        })
    }

    fn jpeg_form() -> UploadInput {
        UploadInput {
            title: Some("Dunes".into()),
            description: Some("Sand at noon".into()),
            category: Some("Nature".into()),
            tags: Some("desert, sand".into()),
            resolution: Some("2560x1440".into()),
            file: Some(UploadFile { file_name: "dunes.jpeg".into(), content_type: Some("image/jpeg".into()), bytes: vec![1; 32] }),
        }
    }

    #[tokio::test]
    async fn category_page_returns_most_recent_first() {
        let f = fixture();
        for (t, c, d) in [("n1", "Nature", 1), ("s1", "Space", 2), ("n2", "Nature", 3), ("s2", "Space", 4), ("n3", "Nature", 5)] {
            f.repo.insert(record(t, c, d)).await.unwrap();
        }
        let page = f.svc.list(&query("1", "2", Some("Nature"), None)).await.unwrap();
        let titles: Vec<_> = page.wallpapers.iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["n3", "n2"]);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 1);
    }

    #[tokio::test]
    async fn page_sizes_and_total_pages_hold_for_many_limits() {
        let f = fixture();
        for i in 0..7 {
            f.repo.insert(record(&format!("w{i}"), "Nature", i)).await.unwrap();
        }
        for limit in 1..=8u64 {
            let mut seen = 0;
            let total_pages = 7u64.div_ceil(limit);
            for page in 1..=total_pages + 1 {
                let p = f.svc.list(&query(&page.to_string(), &limit.to_string(), None, None)).await.unwrap();
                assert!(p.wallpapers.len() as u64 <= limit);
                assert_eq!(p.total_pages, total_pages);
                seen += p.wallpapers.len();
            }
            assert_eq!(seen, 7);
        }
    }

    #[tokio::test]
    async fn identical_timestamps_break_ties_by_id() {
        let f = fixture();
        for t in ["a", "b", "c"] {
            f.repo.insert(record(t, "Nature", 0)).await.unwrap();
        }
        let page = f.svc.list(&WallpaperQuery::default()).await.unwrap();
        let ids: Vec<_> = page.wallpapers.iter().map(|w| w.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn case_varied_search_finds_title() {
        let f = fixture();
        f.repo.insert(record("Cosmic Galaxy", "Space", 1)).await.unwrap();
        f.repo.insert(record("Ocean", "Nature", 2)).await.unwrap();
        let page = f.svc.list(&query("1", "12", Some("all"), Some("MIC gal"))).await.unwrap();
        assert_eq!(page.wallpapers.len(), 1);
        assert_eq!(page.wallpapers[0].title, "Cosmic Galaxy");
    }

    #[tokio::test]
    async fn empty_store_has_zero_pages() {
        let page = fixture().svc.list(&WallpaperQuery::default()).await.unwrap();
        assert!(page.wallpapers.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[tokio::test]
    async fn upload_without_file_writes_nothing() {
        let f = fixture();
        let input = UploadInput { file: None, ..jpeg_form() };
        let err = f.svc.upload(input, &AuthContext::Anonymous).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::MissingFile)));
        assert_eq!(f.repo.insert_count(), 0);
        assert_eq!(f.media.stored_count(), 0);
    }

    #[tokio::test]
    async fn upload_gif_is_unsupported() {
        let f = fixture();
        let mut input = jpeg_form();
        input.file = Some(UploadFile { file_name: "x.gif".into(), content_type: Some("image/gif".into()), bytes: vec![1] });
        let err = f.svc.upload(input, &AuthContext::Anonymous).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::UnsupportedFileType(_))));
        assert_eq!(err.code(), 1002);
    }

    #[tokio::test]
    async fn upload_respects_configured_limit() {
        let f = fixture();
        let svc = WallpaperService::new(f.repo.clone(), f.media.clone()).with_policy(UploadPolicy::new(16));
        let err = svc.upload(jpeg_form(), &AuthContext::Anonymous).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::FileTooLarge { size: 32, max: 16 })));
    }

    #[tokio::test]
    async fn anonymous_and_rejected_uploads_have_no_owner() {
        let f = fixture();
        let w = f.svc.upload(jpeg_form(), &AuthContext::Rejected("expired".into())).await.unwrap();
        assert_eq!(w.user_id, None);
        assert_eq!(w.downloads, 0);
        assert!(w.image_url.starts_with("memory://"));
        assert_eq!(f.svc.get(w.id).await.unwrap(), w);
    }

    #[tokio::test]
    async fn media_failure_is_storage_unavailable() {
        let repo = Arc::new(MemoryWallpaperRepository::default());
        let svc = WallpaperService::new(repo.clone(), Arc::new(MemoryMediaStore::failing()));
        let err = svc.upload(jpeg_form(), &AuthContext::Anonymous).await.unwrap_err();
        assert!(matches!(err, ServiceError::StorageUnavailable(_)));
        assert_eq!(repo.insert_count(), 0);
    }

    #[tokio::test]
    async fn persistence_failure_after_media_write_surfaces() {
        let f = fixture();
        f.repo.set_unavailable(true);
        let err = f.svc.upload(jpeg_form(), &AuthContext::Anonymous).await.unwrap_err();
        assert!(matches!(err, ServiceError::StorageUnavailable(_)));
        assert_eq!(f.media.stored_count(), 1);
    }

    #[tokio::test]
    async fn download_requires_subject_and_leaves_count() {
        let f = fixture();
        let w = f.repo.insert(record("w", "Nature", 0)).await.unwrap();
        let err = f.svc.increment_download(w.id, &AuthContext::Anonymous).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        let err = f.svc.increment_download(w.id, &AuthContext::Rejected("bad sig".into())).await.unwrap_err();
        assert_eq!(err.code(), 1201);
        assert_eq!(f.svc.get(w.id).await.unwrap().downloads, 0);
    }

    #[tokio::test]
    async fn download_unknown_id_is_not_found() {
        let err = fixture().svc.increment_download(Uuid::new_v4(), &AuthContext::authenticated("u")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_downloads_are_not_lost() {
        let f = fixture();
        let w = f.repo.insert(record("popular", "Nature", 0)).await.unwrap();
        let svc = Arc::new(f.svc);
        let mut handles = Vec::new();
        for i in 0..50 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.increment_download(w.id, &AuthContext::authenticated(format!("user_{i}"))).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(svc.get(w.id).await.unwrap().downloads, 50);
    }

    #[tokio::test]
    async fn categories_are_distinct_and_sorted() {
        let f = fixture();
        for (t, c) in [("a", "Space"), ("b", "Nature"), ("c", "Space"), ("d", "Abstract")] {
            f.repo.insert(record(t, c, 0)).await.unwrap();
        }
        assert_eq!(f.svc.categories().await.unwrap(), vec!["Abstract", "Nature", "Space"]);
    }

    #[tokio::test]
    async fn seeding_happens_only_on_empty_store() {
        let f = fixture();
        assert_eq!(f.svc.seed_if_empty().await.unwrap(), 5);
        assert_eq!(f.svc.seed_if_empty().await.unwrap(), 0);
        assert_eq!(f.repo.insert_count(), 5);

        let g = fixture();
        g.repo.insert(record("mine", "Nature", 0)).await.unwrap();
        assert_eq!(g.svc.seed_if_empty().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fallback_serves_sample_catalog_when_store_down() {
        let f = fixture();
        f.repo.set_unavailable(true);
        let err = f.svc.list(&WallpaperQuery::default()).await.unwrap_err();
        assert_eq!(err.code(), 1300);

        let svc = WallpaperService::new(f.repo.clone(), f.media.clone()).with_fallback(Arc::new(StaticCatalog::new()));
        let page = svc.list(&query("1", "12", Some("Space"), None)).await.unwrap();
        assert_eq!(page.wallpapers.len(), 1);
        assert_eq!(page.wallpapers[0].title, "Cosmic Galaxy");
        assert_eq!(svc.categories().await.unwrap().len(), 4);
        assert!(matches!(svc.get(Uuid::from_u128(1)).await, Err(ServiceError::StorageUnavailable(_))));
    }
}
