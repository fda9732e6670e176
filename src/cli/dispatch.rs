//! Module registry and command routing
//!
//! Functional modules are collected in a [`Registry`] that is handed to the
//! [`Dispatcher`] when it is built. The dispatcher picks a module from the
//! first argument and passes the rest to it.

use crate::ui::Console;

/// Whether a handled command succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn is_success(&self) -> bool {
        *self == Status::Success
    }
}

/// A functional module reachable through the dispatcher
pub trait Module {
    /// Name used to address the module on the command line
    fn name(&self) -> &str;

    /// One line shown in the top-level help
    fn description(&self) -> &str;

    /// Handle `action` with its remaining arguments
    ///
    /// Errors are reported to the user inside the module and only surface
    /// here as [`Status::Failure`].
    fn handle_command(&mut self, action: &str, args: Vec<String>) -> Status;
}

/// The set of loaded modules
#[derive(Default)]
pub struct Registry {
    modules: Vec<Box<dyn Module>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module; a module with the same name is replaced
    pub fn register(&mut self, module: Box<dyn Module>) {
        let name = module.name().to_lowercase();
        self.modules.retain(|m| m.name().to_lowercase() != name);
        tracing::debug!(module = %name, "module registered");
        self.modules.push(module);
    }

    /// Builder form of [`Registry::register`]
    pub fn with(mut self, module: Box<dyn Module>) -> Self {
        self.register(module);
        self
    }

    /// Find a module by name, ignoring case
    pub fn find_mut(&mut self, name: &str) -> Option<&mut (dyn Module + 'static)> {
        self.modules
            .iter_mut()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .map(|m| m.as_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// (name, description) of every module, in registration order
    pub fn summaries(&self) -> Vec<(String, String)> {
        self.modules
            .iter()
            .map(|m| (m.name().to_lowercase(), m.description().to_string()))
            .collect()
    }
}

/// Routes command lines to registered modules
pub struct Dispatcher {
    registry: Registry,
    default_module: Option<String>,
    console: Console,
}

impl Dispatcher {
    pub fn new(registry: Registry, console: Console) -> Self {
        Dispatcher {
            registry,
            default_module: None,
            console,
        }
    }

    /// Route arguments that do not start with a module name to `name`
    pub fn with_default_module(mut self, name: &str) -> Self {
        self.default_module = Some(name.to_string());
        self
    }

    /// Dispatch `<module> <action> [args...]` or, with a default module,
    /// `<action> [args...]`
    pub fn dispatch(&mut self, mut args: Vec<String>) -> Status {
        if args.is_empty() {
            self.print_help();
            return Status::Success;
        }

        let module_name = if self.registry.contains(&args[0]) {
            args.remove(0)
        } else if let Some(default) = &self.default_module {
            default.clone()
        } else {
            let unknown = args.remove(0);
            if unknown.eq_ignore_ascii_case("help") {
                self.print_help();
                return Status::Success;
            }
            self.console
                .print_error(&format!("Unknown module: '{}'.", unknown));
            self.print_help();
            return Status::Failure;
        };

        let action = if args.is_empty() {
            "help".to_string()
        } else {
            args.remove(0)
        };

        match self.registry.find_mut(&module_name) {
            Some(module) => {
                tracing::debug!(module = %module_name, action = %action, "dispatching command");
                module.handle_command(&action, args)
            }
            None => {
                self.console
                    .print_error(&format!("Unknown module: '{}'.", module_name));
                self.print_help();
                Status::Failure
            }
        }
    }

    /// Print the top-level help listing every module
    pub fn print_help(&self) {
        self.console.print_line("");
        self.console.print_table(
            "taskchain - YAML task chain runner",
            ["Module", "Description"],
            &self.registry.summaries(),
        );
        self.console.print_line("");
        self.console
            .print_line("Usage: taskchain [OPTIONS] [module] <action> [args...]");
        self.console
            .print_line("For help on a specific module, type: taskchain <module> help");
        self.console.print_line("");
    }
}
