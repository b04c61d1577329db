use std::sync::Arc;

use service::registry::playlist_store::PlaylistStore;
use service::upload::UploadService;

/// Shared per-listener state. Both listeners share one registry; only the
/// public base URL (scheme and port) differs.
#[derive(Clone)]
pub struct AppState {
    pub uploads: Arc<UploadService>,
    pub base_url: Arc<str>,
}

impl AppState {
    pub fn new(uploads: Arc<UploadService>, base_url: impl Into<Arc<str>>) -> Self {
        Self { uploads, base_url: base_url.into() }
    }

    pub fn store(&self) -> &Arc<dyn PlaylistStore> {
        self.uploads.store()
    }

    /// Same registry, different public base URL.
    pub fn with_base_url(&self, base_url: impl Into<Arc<str>>) -> Self {
        Self { uploads: Arc::clone(&self.uploads), base_url: base_url.into() }
    }
}

/// `scheme://host:port` as clients see it.
pub fn base_url(scheme: &str, host: &str, port: u16) -> String {
    format!("{scheme}://{host}:{port}")
}
