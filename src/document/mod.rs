//! Task document handling
//!
//! This module handles parsing of task definition files, validation of
//! their structure, and the directory they are stored in.

pub mod parse;
pub mod schema;
pub mod store;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use store::*;
pub use types::*;
