//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores and helpers for persisting small
//! maps as JSON.

pub mod json_map_store;
