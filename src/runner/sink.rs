//! Command sinks
//!
//! The engine hands every resolved command to a [`CommandSink`] and does not
//! observe the result.

use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};

/// Receiver of fully resolved commands
pub trait CommandSink {
    /// Execute `command`; success or failure is not reported back
    fn dispatch(&mut self, command: &str);
}

/// Runs commands through a shell interpreter
#[derive(Debug, Clone)]
pub struct ShellSink {
    /// Interpreter and its arguments, e.g. `["sh", "-c"]`
    pub interpreter: Vec<String>,

    /// Working directory for spawned commands
    pub working_dir: Option<PathBuf>,
}

impl ShellSink {
    pub fn new() -> Self {
        ShellSink {
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            working_dir: None,
        }
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        if !interpreter.is_empty() {
            self.interpreter = interpreter;
        }
        self
    }

    /// Set the working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }
}

impl Default for ShellSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSink for ShellSink {
    fn dispatch(&mut self, command: &str) {
        let (program, args) = match self.interpreter.split_first() {
            Some(split) => split,
            None => return,
        };

        let mut child = StdCommand::new(program);
        child.args(args).arg(command);
        if let Some(dir) = &self.working_dir {
            child.current_dir(dir);
        }
        child
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        match child.status() {
            Ok(status) if !status.success() => {
                tracing::warn!(command, code = ?status.code(), "command exited unsuccessfully");
            }
            Ok(_) => tracing::debug!(command, "command finished"),
            Err(e) => tracing::warn!(command, error = %e, "failed to spawn command"),
        }
    }
}

/// Prints commands instead of running them
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintSink;

impl CommandSink for PrintSink {
    fn dispatch(&mut self, command: &str) {
        println!("[DRY-RUN] {}", command);
    }
}

/// Keeps dispatched commands in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    commands: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, in dispatch order
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl CommandSink for RecordingSink {
    fn dispatch(&mut self, command: &str) {
        self.commands.push(command.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.dispatch("first");
        sink.dispatch("second");
        assert_eq!(sink.commands(), &["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_shell_sink_runs_command() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = ShellSink::new().with_working_dir(temp_dir.path().to_path_buf());

        sink.dispatch("echo ran > marker.txt");

        let marker = fs::read_to_string(temp_dir.path().join("marker.txt")).unwrap();
        assert_eq!(marker.trim(), "ran");
    }

    #[test]
    fn test_shell_sink_swallows_failures() {
        let mut sink = ShellSink::new();
        sink.dispatch("exit 3");
    }

    #[test]
    fn test_empty_interpreter_keeps_default() {
        let sink = ShellSink::new().with_interpreter(vec![]);
        assert_eq!(sink.interpreter, vec!["sh", "-c"]);
    }
}
