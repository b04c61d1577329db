pub mod playlist_store;
