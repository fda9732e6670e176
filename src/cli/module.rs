//! The task module
//!
//! Handles `run`, `list`, `show`, `define` and `help`. This is the boundary
//! where every error is reported to the user; nothing propagates past
//! [`TaskModule::handle_command`].

use crate::cli::dispatch::{Module, Status};
use crate::cli::prompt::Prompt;
use crate::cli::wizard::{Wizard, WizardOutcome};
use crate::datastore::DataStore;
use crate::document::{parse_document_file, TaskDocument, TaskStore};
use crate::error::Result;
use crate::runner::{
    merge_variables, resolve_overrides, CommandSink, Engine, RunReport, RuntimeContext,
    StepState,
};
use crate::ui::Console;
use std::collections::HashMap;
use std::path::Path;

/// Task module: runs, lists, shows and defines task files
pub struct TaskModule {
    store: TaskStore,
    engine: Engine,
    data: Box<dyn DataStore>,
    sink: Box<dyn CommandSink>,
    prompt: Box<dyn Prompt>,
    console: Console,
}

impl TaskModule {
    pub fn new(
        store: TaskStore,
        engine: Engine,
        data: Box<dyn DataStore>,
        sink: Box<dyn CommandSink>,
        prompt: Box<dyn Prompt>,
        console: Console,
    ) -> Self {
        TaskModule {
            store,
            engine,
            data,
            sink,
            prompt,
            console,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Load, resolve and execute a task file
    pub fn run_task(
        &mut self,
        file: Option<&str>,
        overrides: &HashMap<String, String>,
    ) -> Result<RunReport> {
        let path = self.store.resolve(file)?;
        self.console.print_status(&format!(
            "Loading task from '{}'...",
            display_file_name(&path)
        ));
        let document = parse_document_file(&path)?;

        let vars = merge_variables(&document.variables, overrides);
        let ctx = RuntimeContext::new(self.data.as_ref(), self.sink.as_mut())
            .with_vars(vars)
            .with_console(self.console);

        let report = self.engine.run(&document, ctx);
        self.console.print_debug(&format!(
            "{} executed, {} skipped, {} failed",
            report.count(StepState::Executed),
            report.count(StepState::Skipped),
            report.count(StepState::Failed)
        ));
        Ok(report)
    }

    /// Print every task file in the task directory
    pub fn list_tasks(&self) -> Result<()> {
        let dir = self.store.dir().display().to_string();
        self.console
            .print_status(&format!("Listing available tasks in '{}'...", dir));

        let entries = self.store.list()?;
        if entries.is_empty() {
            self.console
                .print_status(&format!("No task files found in '{}'.", dir));
            return Ok(());
        }

        let rows: Vec<(String, String)> = entries
            .into_iter()
            .map(|entry| (entry.file_name, entry.description))
            .collect();
        self.console
            .print_table("Available Tasks", ["Task File", "Description"], &rows);
        Ok(())
    }

    /// Print the contents of a task file without running it
    pub fn show_task(&self, file: Option<&str>) -> Result<()> {
        let path = self.store.resolve(file)?;
        let document = parse_document_file(&path)?;

        for line in describe(&document, &display_file_name(&path)) {
            self.console.print_line(&line);
        }
        Ok(())
    }

    /// Run the interactive definition wizard
    pub fn define_task(&mut self) -> Result<WizardOutcome> {
        let wizard = Wizard::new(&self.store, self.console);
        Ok(wizard.run(self.prompt.as_mut())?)
    }

    /// Print module help
    pub fn print_help(&self) {
        let dir = self.store.dir().display();
        let rows = vec![
            (
                "run <file>".to_string(),
                "Parses and executes the specified task file.".to_string(),
            ),
            (
                "list".to_string(),
                format!("Lists all tasks in the task directory ({}).", dir),
            ),
            (
                "show <file>".to_string(),
                "Displays the contents of a task file without running it.".to_string(),
            ),
            (
                "define".to_string(),
                "Starts an interactive wizard to create a new task file.".to_string(),
            ),
            ("help".to_string(), "Shows this help menu.".to_string()),
        ];

        self.console.print_line("");
        self.console.print_line("Task Module Help");
        self.console.print_line("----------------");
        self.console
            .print_line("Runs automated command sequences from YAML files.");
        self.console.print_line("");
        self.console
            .print_line("Usage: taskchain [task] <action> [file] [--vars \"KEY=VALUE ...\"]");
        self.console.print_line("");
        self.console
            .print_table("", ["Action", "Description"], &rows);
        self.console.print_line("");
        self.console
            .print_line("Example: taskchain run my_scan.yml --vars \"RHOSTS=10.0.0.0/24\"");
    }

    fn report(&self, result: Result<Status>) -> Status {
        match result {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(error = ?e, "command failed");
                self.console.print_error(&e.to_string());
                Status::Failure
            }
        }
    }
}

impl Module for TaskModule {
    fn name(&self) -> &str {
        "task"
    }

    fn description(&self) -> &str {
        "Manages and runs automated task chains from YAML files."
    }

    fn handle_command(&mut self, action: &str, mut args: Vec<String>) -> Status {
        let overrides = resolve_overrides(&mut args);
        let file = args.first().map(String::as_str);

        let result = match action.to_lowercase().as_str() {
            "run" => self.run_task(file, &overrides).map(|report| {
                if report.is_completed() {
                    Status::Success
                } else {
                    Status::Failure
                }
            }),
            "list" => self.list_tasks().map(|_| Status::Success),
            "show" => self.show_task(file).map(|_| Status::Success),
            "define" => self.define_task().map(|_| Status::Success),
            "help" => {
                self.print_help();
                Ok(Status::Success)
            }
            _ => {
                self.console.print_error(&format!(
                    "Unknown action '{}' for the task module.",
                    action
                ));
                self.print_help();
                Ok(Status::Failure)
            }
        };

        self.report(result)
    }
}

/// Lines printed by `show`
pub fn describe(document: &TaskDocument, file_name: &str) -> Vec<String> {
    let rule = "-".repeat(50);
    let mut lines = vec![
        String::new(),
        format!("Task Details: {}", document.display_name()),
        format!("File: {}", file_name),
        format!("Author: {}", document.author.as_deref().unwrap_or("N/A")),
        format!(
            "Description: {}",
            document.description.as_deref().unwrap_or("N/A")
        ),
        rule.clone(),
        "Variables (Defaults):".to_string(),
    ];

    if document.variables.is_empty() {
        lines.push("  None".to_string());
    } else {
        for (key, value) in &document.variables {
            lines.push(format!("  {}: {}", key, value));
        }
    }
    lines.push(rule);

    lines.push("Steps:".to_string());
    for (i, step) in document.steps.iter().enumerate() {
        lines.push(format!(
            "  [Step {}] {}",
            i + 1,
            step.name.as_deref().unwrap_or("")
        ));
        lines.push(format!(
            "    Desc: {}",
            step.description.as_deref().unwrap_or("N/A")
        ));
        lines.push(format!("    Cmd:  '{}'", step.command.replace('\n', " ")));
        match &step.run_if {
            Some(group) => {
                lines.push(format!("    Run If (Logic: {}):", group.logic));
                for condition in &group.conditions {
                    lines.push(format!("      - {}", condition));
                }
            }
            None => lines.push("    Run If: Always".to_string()),
        }
    }
    lines.push(String::new());
    lines
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::ScriptedPrompt;
    use crate::datastore::SnapshotStore;
    use crate::document::parse_document;
    use crate::runner::RecordingSink;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn module(dir: &Path, answers: Vec<&str>) -> TaskModule {
        TaskModule::new(
            TaskStore::new(dir),
            Engine::new(Duration::ZERO),
            Box::new(SnapshotStore::empty()),
            Box::new(RecordingSink::new()),
            Box::new(ScriptedPrompt::new(answers)),
            Console::silent(),
        )
    }

    #[test]
    fn test_run_applies_overrides() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("scan.yml"),
            "vars:\n  VAR: A\nsteps:\n  - command: echo {{VAR}}\n",
        )
        .unwrap();
        let mut m = module(temp_dir.path(), vec![]);

        let mut overrides = HashMap::new();
        overrides.insert("VAR".to_string(), "B".to_string());
        let report = m.run_task(Some("scan.yml"), &overrides).unwrap();

        assert_eq!(report.dispatched(), vec!["echo B"]);
    }

    #[test]
    fn test_handle_command_statuses() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("ok.yml"),
            "steps:\n  - command: echo {{X}}\n",
        )
        .unwrap();
        let mut m = module(temp_dir.path(), vec![]);

        let run = |m: &mut TaskModule, list: &[&str]| {
            m.handle_command(list[0], list[1..].iter().map(|s| s.to_string()).collect())
        };

        assert_eq!(run(&mut m, &["run", "ok.yml", "--vars", "X=1"]), Status::Success);
        assert_eq!(run(&mut m, &["run", "ok.yml"]), Status::Failure);
        assert_eq!(run(&mut m, &["run", "missing.yml"]), Status::Failure);
        assert_eq!(run(&mut m, &["run"]), Status::Failure);
        assert_eq!(run(&mut m, &["LIST"]), Status::Success);
        assert_eq!(run(&mut m, &["show", "ok.yml"]), Status::Success);
        assert_eq!(run(&mut m, &["help"]), Status::Success);
        assert_eq!(run(&mut m, &["explode"]), Status::Failure);
    }

    #[test]
    fn test_define_saves_into_task_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut m = module(
            temp_dir.path(),
            vec!["Demo", "", "", "", "One", "", "echo 1", "", "demo", "y"],
        );

        assert_eq!(m.handle_command("define", Vec::new()), Status::Success);
        assert!(temp_dir.path().join("demo.yml").exists());
    }

    #[test]
    fn test_describe_document() {
        let doc = parse_document(
            r#"
name: Recon
vars:
  RHOSTS: 10.0.0.0/24
steps:
  - name: Sweep
    command: db_nmap {{RHOSTS}}
  - command: exploit
    run_if:
      logic: or
      conditions:
        - model: vulns
          where: "name LIKE '%ms17%'"
"#,
        )
        .unwrap();

        let lines = describe(&doc, "recon.yml");
        assert!(lines.contains(&"Task Details: Recon".to_string()));
        assert!(lines.contains(&"Author: N/A".to_string()));
        assert!(lines.contains(&"  RHOSTS: 10.0.0.0/24".to_string()));
        assert!(lines.contains(&"    Cmd:  'db_nmap {{RHOSTS}}'".to_string()));
        assert!(lines.contains(&"    Run If: Always".to_string()));
        assert!(lines.contains(&"    Run If (Logic: OR):".to_string()));
        assert!(lines.contains(&"      - `vulns` where `name LIKE '%ms17%'`".to_string()));
    }
}
