//! Taskchain - a YAML task chain runner
//!
//! Task files describe an ordered list of command templates with default
//! variables. Each step may be guarded by conditions checked against a data
//! store of hosts, services, vulns and creds. Steps whose guard holds are
//! resolved and handed to a command sink in order.

// Public modules
pub mod cli;
pub mod datastore;
pub mod document;
pub mod error;
pub mod logging;
pub mod runner;
pub mod settings;
pub mod ui;

// Re-export commonly used types
pub use error::{Result, TaskchainError};

/// Current version of Taskchain
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
