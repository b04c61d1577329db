//! Service layer for the playlist registry.
//! - File-backed JSON storage with flush-on-write.
//! - Upload resolution (stored file vs. remote URL).
//! - Host network identity.

pub mod errors;
pub mod storage;
pub mod registry;
pub mod file;
pub mod upload;
pub mod host;
