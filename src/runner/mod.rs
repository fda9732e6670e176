//! Task execution engine
//!
//! This module handles the execution of task documents, including variable
//! resolution, guard evaluation and command dispatch.

pub mod condition;
pub mod context;
pub mod engine;
pub mod interpolate;
pub mod sink;

// Re-export main types
pub use condition::*;
pub use context::*;
pub use engine::*;
pub use interpolate::*;
pub use sink::*;
