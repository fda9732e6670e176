//! Execution context for task running
//!
//! The context carries everything one run needs: the merged variables, the
//! data store guards are checked against, the sink commands are sent to and
//! the console progress is printed on. It is built fresh for every run and
//! moved into the engine.

use crate::datastore::DataStore;
use crate::runner::sink::CommandSink;
use crate::ui::Console;
use std::collections::HashMap;

/// Execution context for a single run
pub struct RuntimeContext<'a> {
    /// Variables (task defaults merged with runtime overrides)
    pub vars: HashMap<String, String>,

    /// Data store queried by step guards
    pub store: &'a dyn DataStore,

    /// Where resolved commands are sent
    pub sink: &'a mut dyn CommandSink,

    /// Progress output
    pub console: Console,
}

impl<'a> RuntimeContext<'a> {
    /// Create a context with no variables and a silent console
    pub fn new(store: &'a dyn DataStore, sink: &'a mut dyn CommandSink) -> Self {
        RuntimeContext {
            vars: HashMap::new(),
            store,
            sink,
            console: Console::silent(),
        }
    }

    /// Set variables
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    /// Set the console
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }
}
