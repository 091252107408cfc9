//! nser Replay - Run history
//!
//! This crate provides the persistence side of tool execution:
//! - Run: lifecycle record types
//! - Store: run record persistence (SQLite)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod run;
pub mod store;

pub use error::{Error, Result};
pub use run::{NewRun, RunRecord, RunStatus, RunSummary, ABANDONED_EXIT_CODE};
pub use store::{default_data_dir, default_db_path, RunStore, RunStoreTrait};
