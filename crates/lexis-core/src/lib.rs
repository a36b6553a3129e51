//! lexis-core library.
//!
//! Vocabulary data model, the remote store seam and its SQLite backend, the
//! local preference store, the favorite/upvote reconciler, the view layer,
//! exports, import/backup, study sessions and the offline cache shell.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at module seams, each mapping to an
//!   [`error::ErrorCode`]; `anyhow::Result` for setup paths.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod lock;
pub mod model;
pub mod offline;
pub mod prefs;
pub mod reconcile;
pub mod stats;
pub mod store;
pub mod study;
pub mod view;
