//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_media_dir` without depending directly on `common`.

/// Ensure the local media directory exists before serving it.
pub async fn ensure_media_dir(dir: &str) -> anyhow::Result<()> {
    common::env::ensure_data_dir(dir).await
}
