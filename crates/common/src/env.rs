//! Environment/runtime helpers
//!
//! Creates the directories the server writes to at startup.

use tracing::info;

/// Ensure the data directory exists; create it when missing.
pub async fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(data_dir).await.is_ok() {
        return Ok(());
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    info!(%data_dir, "created data directory");
    Ok(())
}
