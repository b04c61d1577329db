use std::{io::ErrorKind, path::{Path, PathBuf}};

use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use crate::errors::ServiceError;

/// Directory holding uploaded playlist files, served under `/uploads/`.
#[derive(Clone, Debug)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `<unix-millis>-<sanitized name>` and return the stored name.
    /// Never overwrites: on a clash a random suffix is inserted.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        let clean = sanitize_file_name(original_name);
        let stamp = chrono::Utc::now().timestamp_millis();

        let name = format!("{stamp}-{clean}");
        match self.write_new(&name, bytes).await {
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let name = format!("{stamp}-{}-{clean}", uuid::Uuid::new_v4().simple());
                self.write_new(&name, bytes).await.map_err(ServiceError::storage)?;
                Ok(name)
            }
            Err(e) => Err(ServiceError::storage(e)),
            Ok(()) => Ok(name),
        }
    }

    async fn write_new(&self, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.root.join(name);
        let mut file = fs::OpenOptions::new().write(true).create_new(true).open(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        debug!(file = %path.display(), bytes = bytes.len(), "upload stored");
        Ok(())
    }
}

/// Keep the last path component and map anything outside `[A-Za-z0-9._-]` to `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let clean: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let clean = clean.trim_start_matches('.');
    if clean.is_empty() { "playlist.m3u".to_string() } else { clean.to_string() }
}
