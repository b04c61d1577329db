//! Upload resolution: turn a submitted file or URL into a stored playlist link.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::file::upload_dir::UploadDir;
use crate::registry::playlist_store::PlaylistStore;

/// A file part received with an upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Browsers submit an empty, unnamed part when no file was chosen.
    pub fn is_blank(&self) -> bool {
        self.file_name.trim().is_empty() && self.bytes.is_empty()
    }
}

/// Fields of a `POST /upload` request, whatever the body encoding.
#[derive(Debug, Clone, Default)]
pub struct PlaylistUpload {
    pub mac_id: Option<String>,
    pub m3u_url: Option<String>,
    pub file: Option<UploadedFile>,
}

pub struct UploadService {
    store: Arc<dyn PlaylistStore>,
    uploads: UploadDir,
}

impl UploadService {
    pub fn new(store: Arc<dyn PlaylistStore>, uploads: UploadDir) -> Self {
        Self { store, uploads }
    }

    pub fn store(&self) -> &Arc<dyn PlaylistStore> {
        &self.store
    }

    /// Validate, resolve the link and append it. Returns the full list for the MAC ID.
    ///
    /// `base_url` is the scheme/host/port prefix clients use to reach `/uploads/`.
    pub async fn register(&self, upload: PlaylistUpload, base_url: &str) -> Result<Vec<String>, ServiceError> {
        // keys are opaque: blank check only, stored exactly as submitted
        let mac_id = non_blank(upload.mac_id).ok_or(ServiceError::MissingIdentifier)?;
        let file = upload.file.filter(|f| !f.is_blank());
        let url = non_blank(upload.m3u_url);

        let (link, stored) = match (file, url) {
            (Some(file), _) => {
                let name = self.uploads.save(&file.file_name, &file.bytes).await?;
                (format!("{}/uploads/{}", base_url.trim_end_matches('/'), name), Some(name))
            }
            (None, Some(url)) => (url, None),
            (None, None) => return Err(ServiceError::MissingReference),
        };

        match self.store.append(&mac_id, link).await {
            Ok(links) => {
                info!(mac_id = %mac_id, from_file = stored.is_some(), "playlist registered");
                Ok(links)
            }
            Err(e) => {
                if let Some(name) = stored {
                    warn!(mac_id = %mac_id, dir = %self.uploads.root().display(), file = %name, "upload kept on disk without a registry entry");
                }
                Err(e)
            }
        }
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::playlist_store::FilePlaylistStore;
    use std::path::PathBuf;

    async fn setup() -> anyhow::Result<(UploadService, PathBuf)> {
        let root = std::env::temp_dir().join(format!("upload_svc_{}", uuid::Uuid::new_v4()));
        let uploads = root.join("uploads");
        tokio::fs::create_dir_all(&uploads).await?;
        let store: Arc<dyn PlaylistStore> = FilePlaylistStore::new(root.join("data.json")).await?;
        Ok((UploadService::new(store, UploadDir::new(uploads)), root))
    }

    #[tokio::test]
    async fn missing_mac_id_is_rejected_without_mutation() -> anyhow::Result<()> {
        let (svc, root) = setup().await?;
        for mac_id in [None, Some("".to_string()), Some("   ".to_string())] {
            let res = svc
                .register(PlaylistUpload { mac_id, m3u_url: Some("http://example.com/x.m3u".into()), file: None }, "http://h:1")
                .await;
            assert!(matches!(res, Err(ServiceError::MissingIdentifier)));
        }
        assert!(svc.store().mac_ids().await.is_empty());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_reference_is_rejected_without_mutation() -> anyhow::Result<()> {
        let (svc, root) = setup().await?;
        let blank_file = UploadedFile { file_name: String::new(), bytes: Vec::new() };
        let res = svc
            .register(PlaylistUpload { mac_id: Some("AA:BB".into()), m3u_url: Some(" ".into()), file: Some(blank_file) }, "http://h:1")
            .await;
        assert!(matches!(res, Err(ServiceError::MissingReference)));
        assert!(svc.store().mac_ids().await.is_empty());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_wins_over_url_and_links_to_uploads() -> anyhow::Result<()> {
        let (svc, root) = setup().await?;
        let file = UploadedFile { file_name: "tv list.m3u".into(), bytes: b"#EXTM3U\n".to_vec() };
        let links = svc
            .register(
                PlaylistUpload { mac_id: Some(" AA:BB ".into()), m3u_url: Some("http://example.com/x.m3u".into()), file: Some(file) },
                "http://192.168.1.5:3000/",
            )
            .await?;
        assert_eq!(links.len(), 1);
        let name = links[0]
            .strip_prefix("http://192.168.1.5:3000/uploads/")
            .expect("link points at uploads");
        assert!(name.ends_with("-tv_list.m3u"));
        assert_eq!(tokio::fs::read(root.join("uploads").join(name)).await?, b"#EXTM3U\n");
        // identifier is kept verbatim and resolves under the same key
        assert_eq!(svc.store().mac_ids().await, vec![" AA:BB ".to_string()]);
        assert_eq!(svc.store().get(" AA:BB ").await?, links);
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn url_is_stored_verbatim() -> anyhow::Result<()> {
        let (svc, root) = setup().await?;
        let url = "https://cdn.example.com/a.m3u?token=x&y=1";
        let links = svc
            .register(PlaylistUpload { mac_id: Some("AA:BB".into()), m3u_url: Some(url.into()), file: None }, "http://h:1")
            .await?;
        assert_eq!(links, vec![url.to_string()]);
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
