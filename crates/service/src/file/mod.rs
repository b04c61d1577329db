pub mod playlist_store;
pub mod upload_dir;
