//! CLI interface
//!
//! Argument parsing, the module dispatcher, the task module and the
//! interactive definition wizard.

pub mod app;
pub mod dispatch;
pub mod module;
pub mod prompt;
pub mod wizard;

// Re-export main types
pub use app::*;
pub use dispatch::{Dispatcher, Module, Registry, Status};
pub use module::TaskModule;
pub use prompt::{Prompt, ScriptedPrompt, StdinPrompt};
pub use wizard::{Wizard, WizardOutcome};
