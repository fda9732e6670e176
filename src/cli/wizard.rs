//! Interactive task definition
//!
//! Walks the user through the fields of a task document and saves the result
//! in the task directory.

use crate::cli::prompt::Prompt;
use crate::document::{with_task_extension, StepDefinition, TaskDocument, TaskStore};
use crate::error::{WizardError, WizardResult};
use crate::ui::Console;
use std::path::PathBuf;

/// How a wizard session ended
#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    /// The document was written to `path`
    Saved { path: PathBuf, document: TaskDocument },

    /// The user declined to save
    Cancelled,
}

/// Interactive task definition wizard
pub struct Wizard<'a> {
    store: &'a TaskStore,
    console: Console,
}

impl<'a> Wizard<'a> {
    pub fn new(store: &'a TaskStore, console: Console) -> Self {
        Wizard { store, console }
    }

    /// Run the whole session: collect, pick a file name, confirm, save
    pub fn run(&self, prompt: &mut dyn Prompt) -> WizardResult<WizardOutcome> {
        self.console
            .print_status("Interactive Task Definition Wizard (Ctrl+C to cancel)");

        let document = self.collect(prompt)?;

        let file_name = prompt.ask("Save task as (e.g., my_task.yml): ")?;
        if file_name.is_empty() {
            return Err(WizardError::MissingFilename);
        }
        let path = self.store.dir().join(with_task_extension(&file_name));

        if !prompt.confirm(&format!("Save task to '{}'?", path.display()))? {
            self.console.print_status("Save cancelled.");
            return Ok(WizardOutcome::Cancelled);
        }

        self.store.write(&path, &document)?;
        self.console.print_good("Task saved successfully!");

        Ok(WizardOutcome::Saved { path, document })
    }

    /// Ask for the document fields, variables and steps
    pub fn collect(&self, prompt: &mut dyn Prompt) -> WizardResult<TaskDocument> {
        let mut document = TaskDocument {
            name: optional(prompt.ask("Task Name: ")?),
            author: optional(prompt.ask("Author: ")?),
            description: optional(prompt.ask("Description: ")?),
            ..Default::default()
        };

        self.console
            .print_status("Define variables (leave name blank to finish):");
        loop {
            let key = prompt.ask("  Variable Name (e.g., RHOSTS): ")?;
            if key.is_empty() {
                break;
            }
            let value = prompt.ask(&format!("  Default Value for {}: ", key))?;
            document.variables.insert(key, value);
        }

        self.console.print_status("Define steps (leave name blank to finish):");
        loop {
            let name = prompt.ask("  Step Name: ")?;
            if name.is_empty() {
                break;
            }
            let description = optional(prompt.ask("  Step Description: ")?);
            let command = prompt.ask("  Step Command: ")?;
            document.steps.push(StepDefinition {
                name: Some(name),
                description,
                command,
                run_if: None,
            });
        }

        if document.steps.is_empty() {
            return Err(WizardError::EmptyTask);
        }

        Ok(document)
    }
}

fn optional(answer: String) -> Option<String> {
    if answer.is_empty() {
        None
    } else {
        Some(answer)
    }
}
