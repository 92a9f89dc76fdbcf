//! Media storage: persists uploaded image bytes and hands back a public URL.

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::ServiceError;
use crate::wallpaper::upload::UploadFile;

pub mod cloudinary;
pub mod local;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredMedia {
    pub url: String,
    /// Backend-specific handle (Cloudinary public id, local file name).
    pub public_id: String,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media backend rejected upload: {0}")]
    Rejected(String),
    #[error("media transport error: {0}")]
    Transport(String),
    #[error("media io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MediaError> for ServiceError {
    fn from(e: MediaError) -> Self { ServiceError::StorageUnavailable(e.to_string()) }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Single attempt; no retry.
    async fn store(&self, file: &UploadFile) -> Result<StoredMedia, MediaError>;
}

pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Keeps uploaded files in memory and returns `memory://` URLs.
    #[derive(Default)]
    pub struct MemoryMediaStore {
        stored: Mutex<Vec<UploadFile>>,
        fail: bool,
    }

    impl MemoryMediaStore {
        /// A store whose every write fails.
        pub fn failing() -> Self { Self { stored: Mutex::default(), fail: true } }

        pub fn stored_count(&self) -> usize { self.stored.lock().unwrap().len() }
    }

    #[async_trait]
    impl MediaStore for MemoryMediaStore {
        async fn store(&self, file: &UploadFile) -> Result<StoredMedia, MediaError> {
            if self.fail {
                return Err(MediaError::Transport("memory media store offline".into()));
            }
            let mut stored = self.stored.lock().unwrap();
            stored.push(file.clone());
            let public_id = format!("wallpapers/{}", stored.len());
            Ok(StoredMedia { url: format!("memory://{public_id}/{}", file.file_name), public_id })
        }
    }
}
