//! nser Tools - Tool Registry and Execution Engine
//!
//! This crate provides the tool system for nser:
//! - Registry: declarative descriptions of external scanners
//! - Builtins: the shipped recon/scanning/exploit catalog
//! - Health: installation, version and privilege probes
//! - Runner: subprocess execution with persisted lifecycle and live output

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod events;
pub mod health;
pub mod privilege;
pub mod registry;
pub mod resolve;
pub mod runner;

pub use builtins::register_builtins;
pub use error::{Error, Result};
pub use events::{EventBus, EventSink, ToolEvent};
pub use health::{HealthConfig, HealthProber, ToolHealth};
pub use privilege::{check_privileges, PrivilegeInfo};
pub use registry::{ToolCategory, ToolDefinition, ToolRegistry};
pub use resolve::{current_platform, resolve_binary};
pub use runner::{RunRequest, RunResult, RunnerConfig, StreamStart, ToolRunner};
