use async_trait::async_trait;

use crate::errors::ServiceError;

/// Trait abstraction for the MAC ID -> playlist links registry.
/// Implementations must serialize `append` so concurrent callers never lose an entry.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Append `link` to the list for `mac_id` and return the updated list.
    async fn append(&self, mac_id: &str, link: String) -> Result<Vec<String>, ServiceError>;
    async fn get(&self, mac_id: &str) -> Result<Vec<String>, ServiceError>;
    async fn mac_ids(&self) -> Vec<String>;
}
