//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::info;

/// Create the uploads directory and the parent of the state file if missing.
pub async fn ensure_env(uploads_dir: &Path, data_file: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", uploads_dir.display()))?;
    if let Some(data_dir) = data_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    }
    info!(uploads_dir = %uploads_dir.display(), data_file = %data_file.display(), "runtime directories ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_directories() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("ensure_env_{}", uuid::Uuid::new_v4()));
        let uploads = root.join("uploads");
        let data_file = root.join("data").join("data.json");

        ensure_env(&uploads, &data_file).await?;
        assert!(tokio::fs::metadata(&uploads).await?.is_dir());
        assert!(tokio::fs::metadata(root.join("data")).await?.is_dir());
        // the state file itself is left to the store
        assert!(tokio::fs::metadata(&data_file).await.is_err());

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
