use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("MAC ID is required")]
    MissingIdentifier,
    #[error("Either M3U file or URL is required")]
    MissingReference,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn storage(e: impl std::fmt::Display) -> Self { Self::Storage(e.to_string()) }
}
