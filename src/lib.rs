//! Offline-first cache and sync layer for Comprartir shopping lists, pantries
//! and products.
//!
//! Views are read from a local SQLite cache and stay live as the cache
//! changes. Each resource type syncs from the paginated REST API on first
//! observation or on an explicit refresh; mutations are sent to the server and
//! written to the cache once confirmed.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod mapper;
pub mod models;
pub mod repo;
pub mod sync;

pub use app::Comprartir;
