use std::{path::PathBuf, sync::Arc};

use tracing::info;

use crate::errors::ServiceError;
use crate::registry::playlist_store::PlaylistStore;
use crate::storage::json_map_store::JsonMapStore;

/// File-backed playlist registry.
/// Keeps a map of `mac_id -> [link, ...]` persisted as JSON.
pub struct FilePlaylistStore {
    store: Arc<JsonMapStore<String, Vec<String>>>,
}

impl FilePlaylistStore {
    /// Load the registry from the given file path. Creates the file if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, Vec<String>>::new(path).await?;
        let entries = store.len().await;
        info!(file = %store.file_path().display(), entries, "playlist registry loaded");
        Ok(Arc::new(Self { store }))
    }

    pub async fn append(&self, mac_id: &str, link: String) -> Result<Vec<String>, ServiceError> {
        let links = self
            .store
            .update_map(|map| {
                let links = map.entry(mac_id.to_string()).or_default();
                links.push(link);
                Ok(links.clone())
            })
            .await?;
        info!(mac_id, count = links.len(), "playlist link appended");
        Ok(links)
    }

    pub async fn get(&self, mac_id: &str) -> Result<Vec<String>, ServiceError> {
        self.store
            .get(&mac_id.to_string())
            .await
            .ok_or_else(|| ServiceError::not_found("MAC ID"))
    }

    /// Known MAC IDs, sorted.
    pub async fn mac_ids(&self) -> Vec<String> {
        let mut ids = self.store.keys().await;
        ids.sort();
        ids
    }
}

#[async_trait::async_trait]
impl PlaylistStore for FilePlaylistStore {
    async fn append(&self, mac_id: &str, link: String) -> Result<Vec<String>, ServiceError> { self.append(mac_id, link).await }
    async fn get(&self, mac_id: &str) -> Result<Vec<String>, ServiceError> { self.get(mac_id).await }
    async fn mac_ids(&self) -> Vec<String> { self.mac_ids().await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("svc_playlists_{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn append_grows_list_in_order() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = FilePlaylistStore::new(&tmp).await?;

        assert!(matches!(store.get("AA:BB").await, Err(ServiceError::NotFound(_))));

        let first = store.append("AA:BB", "http://example.com/x.m3u".into()).await?;
        assert_eq!(first, vec!["http://example.com/x.m3u"]);

        let second = store.append("AA:BB", "http://example.com/y.m3u".into()).await?;
        assert_eq!(second.len(), first.len() + 1);
        assert_eq!(second.last().map(String::as_str), Some("http://example.com/y.m3u"));
        assert_eq!(store.get("AA:BB").await?, second);

        // duplicates are kept
        let third = store.append("AA:BB", "http://example.com/x.m3u".into()).await?;
        assert_eq!(third.len(), 3);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn reload_restores_every_list() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = FilePlaylistStore::new(&tmp).await?;
        let expected: Vec<String> = (0..5).map(|i| format!("http://example.com/{i}.m3u")).collect();
        for link in &expected {
            store.append("11:22:33:44:55:66", link.clone()).await?;
        }
        store.append("other", "http://example.com/o.m3u".into()).await?;
        drop(store);

        let reloaded = FilePlaylistStore::new(&tmp).await?;
        assert_eq!(reloaded.get("11:22:33:44:55:66").await?, expected);
        assert_eq!(reloaded.mac_ids().await, vec!["11:22:33:44:55:66".to_string(), "other".to_string()]);

        // on-disk shape: one object of string arrays
        let raw: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(raw["other"], serde_json::json!(["http://example.com/o.m3u"]));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_not_lost() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = FilePlaylistStore::new(&tmp).await?;

        let mut tasks = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            let mac = if i % 2 == 0 { "shared" } else { "odd" };
            tasks.push(tokio::spawn(async move {
                store.append(mac, format!("http://example.com/{i}.m3u")).await
            }));
        }
        for t in tasks {
            t.await??;
        }

        assert_eq!(store.get("shared").await?.len(), 16);
        assert_eq!(store.get("odd").await?.len(), 16);

        let reloaded = FilePlaylistStore::new(&tmp).await?;
        assert_eq!(reloaded.get("shared").await?.len(), 16);
        assert_eq!(reloaded.get("odd").await?.len(), 16);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
