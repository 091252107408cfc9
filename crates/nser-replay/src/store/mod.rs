//! Store - Run record persistence using SQLite
//!
//! This module provides the storage layer for tool runs.
//! It uses sqlx for async SQLite access (embedded, single file).

mod helpers;
mod history;
mod run_store;
mod traits;


pub use helpers::{default_data_dir, default_db_path};
pub use run_store::RunStore;
pub use traits::RunStoreTrait;
