use std::{collections::HashMap, hash::Hash, io::ErrorKind, path::{Path, PathBuf}, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a pretty-printed JSON file. Every mutation
/// rewrites the whole file while holding the write lock, so the map in memory
/// and the file on disk are identical once a mutating call returns `Ok`.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Load the store from a path.
    ///
    /// A missing file is created with an empty map. A file that does not parse
    /// is moved aside to `<name>.corrupt-<millis>` and the store starts empty.
    /// Any other read error is returned.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    let backup = quarantine(&file_path).await?;
                    warn!(file = %file_path.display(), backup = %backup.display(), error = %e, "state file is corrupt; starting empty");
                    let empty = HashMap::new();
                    write_atomic(&file_path, &empty).await?;
                    empty
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty = HashMap::new();
                write_atomic(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(ServiceError::storage(e)),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// All keys, in map order.
    pub async fn keys(&self) -> Vec<K> {
        let map = self.inner.read().await;
        map.keys().cloned().collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Insert or replace a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        self.update_map(|m| {
            m.insert(key, value);
            Ok(())
        })
        .await
    }

    /// Apply a mutation to the map and persist it as one critical section.
    ///
    /// The closure runs on a copy; the copy replaces the live map only after
    /// the file write succeeded, so a failed mutation or persist leaves both
    /// untouched.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<R, ServiceError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let out = f(&mut next)?;
        write_atomic(&self.file_path, &next).await?;
        *map = next;
        Ok(out)
    }
}

/// Serialize `map` to a sibling temp file, then rename it over `path`.
async fn write_atomic<T: serde::Serialize>(path: &Path, map: &T) -> Result<(), ServiceError> {
    let data = serde_json::to_vec_pretty(map).map_err(ServiceError::storage)?;
    let tmp = sibling(path, "tmp");
    fs::write(&tmp, &data).await.map_err(ServiceError::storage)?;
    fs::rename(&tmp, path).await.map_err(ServiceError::storage)?;
    debug!(file = %path.display(), bytes = data.len(), "state persisted");
    Ok(())
}

async fn quarantine(path: &Path) -> Result<PathBuf, ServiceError> {
    let backup = sibling(path, &format!("corrupt-{}", chrono::Utc::now().timestamp_millis()));
    fs::rename(path, &backup).await.map_err(ServiceError::storage)?;
    Ok(backup)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
