use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{MediaError, MediaStore, StoredMedia};
use crate::wallpaper::upload::UploadFile;

/// Writes files under a directory that the HTTP layer serves statically.
pub struct LocalMediaStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalMediaStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self { dir: dir.into(), public_base_url: public_base_url.trim_end_matches('/').to_string() }
    }

    pub fn from_config(cfg: &configs::LocalMediaConfig) -> Self { Self::new(&cfg.dir, &cfg.public_base_url) }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, file: &UploadFile) -> Result<StoredMedia, MediaError> {
        let ext = file.extension().unwrap_or_else(|| "bin".to_string());
        let name = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &file.bytes).await?;
        debug!(path = %path.display(), bytes = file.bytes.len(), "media_written");
        Ok(StoredMedia { url: format!("{}/{}", self.public_base_url, name), public_id: name })
    }
}
