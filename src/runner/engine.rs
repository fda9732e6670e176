//! Step execution engine
//!
//! Steps run strictly in document order. Each one starts `Pending` and ends
//! `Skipped` (guard not met), `Failed` (template could not be resolved) or
//! `Executed` (command dispatched). A failed step aborts the run: no later
//! step is evaluated or dispatched, and executed steps are not undone.

use crate::document::TaskDocument;
use crate::error::InterpolationError;
use crate::runner::condition::{evaluate, GuardOutcome};
use crate::runner::context::RuntimeContext;
use crate::runner::interpolate::substitute;
use crate::ui::Console;
use std::fmt;
use std::thread;
use std::time::Duration;

/// Pause after each dispatch, since sinks give no completion signal
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(1);

/// State of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Skipped,
    Failed,
    Executed,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepState::Pending => "pending",
            StepState::Skipped => "skipped",
            StepState::Failed => "failed",
            StepState::Executed => "executed",
        };
        f.write_str(s)
    }
}

/// What happened to one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Zero-based position in the document
    pub index: usize,

    pub label: String,

    pub state: StepState,

    /// Resolved command, once dispatched
    pub command: Option<String>,

    /// Guard diagnostics, when the step has a guard
    pub guard: Option<GuardOutcome>,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed,
    Aborted {
        /// Index of the step that failed
        step: usize,
        reason: InterpolationError,
    },
}

/// Result of running a task document
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub task: String,
    pub steps: Vec<StepRecord>,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    /// Commands dispatched, in order
    pub fn dispatched(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| step.command.as_deref())
            .collect()
    }

    /// Number of steps that ended in `state`
    pub fn count(&self, state: StepState) -> usize {
        self.steps.iter().filter(|step| step.state == state).count()
    }
}

/// Drives a task document through its steps
#[derive(Debug, Clone)]
pub struct Engine {
    settle: Duration,
}

impl Engine {
    pub fn new(settle: Duration) -> Self {
        Engine { settle }
    }

    /// Run every step of `document`, consuming the context
    pub fn run(&self, document: &TaskDocument, ctx: RuntimeContext<'_>) -> RunReport {
        let RuntimeContext {
            vars,
            store,
            sink,
            console,
        } = ctx;

        let mut steps: Vec<StepRecord> = document
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepRecord {
                index,
                label: step.label(index),
                state: StepState::Pending,
                command: None,
                guard: None,
            })
            .collect();

        console.print_good(&format!("Starting task: {}", document.display_name()));
        console.print_rule();
        tracing::info!(task = document.display_name(), steps = steps.len(), "run started");

        let mut outcome = RunOutcome::Completed;

        for (step, record) in document.steps.iter().zip(steps.iter_mut()) {
            console.print_line("");
            console.print_status(&format!("Executing: {}", record.label));

            if step.run_if.is_some() {
                let guard = evaluate(step.run_if.as_ref(), store);
                report_guard(&console, &guard);
                let met = guard.met;
                record.guard = Some(guard);

                if !met {
                    console.print_status("  - Skipping step, 'run_if' condition not met.");
                    record.state = StepState::Skipped;
                    continue;
                }
            }

            if let Some(description) = &step.description {
                console.print_status(&format!("  - Description: {}", description));
            }

            let command = match substitute(&step.command, &vars) {
                Ok(command) => command,
                Err(reason) => {
                    console.print_error(&format!(
                        "  - Variable substitution failed: {}. Check the task file for undefined variables.",
                        reason
                    ));
                    tracing::warn!(step = record.index, error = %reason, "run aborted");
                    record.state = StepState::Failed;
                    outcome = RunOutcome::Aborted {
                        step: record.index,
                        reason,
                    };
                    break;
                }
            };

            console.print_status(&format!("  - Command: {}", command.replace('\n', " ")));
            tracing::debug!(step = record.index, command = %command, "dispatching");
            sink.dispatch(&command);

            if !self.settle.is_zero() {
                thread::sleep(self.settle);
            }

            record.command = Some(command);
            record.state = StepState::Executed;
        }

        console.print_rule();
        match &outcome {
            RunOutcome::Completed => console.print_good("Task finished."),
            RunOutcome::Aborted { step, .. } => console.print_error(&format!(
                "Task aborted at step {}; later steps were not run.",
                step + 1
            )),
        }

        RunReport {
            task: document.display_name().to_string(),
            steps,
            outcome,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE)
    }
}

fn report_guard(console: &Console, guard: &GuardOutcome) {
    for outcome in &guard.conditions {
        match &outcome.result {
            Ok(met) => console.print_status(&format!(
                "    - Condition: {} -> {}",
                outcome.condition,
                if *met { "MET" } else { "NOT MET" }
            )),
            Err(e) => console.print_warning(&format!(
                "    - Condition: {} -> {}",
                outcome.condition, e
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::SnapshotStore;
    use crate::document::parse_document;
    use crate::runner::sink::RecordingSink;

    fn engine() -> Engine {
        Engine::new(Duration::ZERO)
    }

    #[test]
    fn test_runs_every_unguarded_step_in_order() {
        let doc = parse_document(
            r#"
steps:
  - command: one
  - command: two
  - command: three
"#,
        )
        .unwrap();
        let store = SnapshotStore::empty();
        let mut sink = RecordingSink::new();

        let report = engine().run(&doc, RuntimeContext::new(&store, &mut sink));

        assert!(report.is_completed());
        assert_eq!(report.count(StepState::Executed), 3);
        assert_eq!(sink.commands(), &["one", "two", "three"]);
    }

    #[test]
    fn test_undefined_variable_aborts_run() {
        let doc = parse_document(
            r#"
steps:
  - command: first
  - command: use {{UNSET}}
  - command: never
"#,
        )
        .unwrap();
        let store = SnapshotStore::empty();
        let mut sink = RecordingSink::new();

        let report = engine().run(&doc, RuntimeContext::new(&store, &mut sink));

        assert_eq!(
            report.outcome,
            RunOutcome::Aborted {
                step: 1,
                reason: InterpolationError::UndefinedVariable("UNSET".to_string()),
            }
        );
        assert_eq!(report.steps[0].state, StepState::Executed);
        assert_eq!(report.steps[1].state, StepState::Failed);
        assert_eq!(report.steps[2].state, StepState::Pending);
        assert_eq!(sink.commands(), &["first"]);
    }

    #[test]
    fn test_unmet_guard_skips_step() {
        let doc = parse_document(
            r#"
steps:
  - name: guarded
    command: exploit
    run_if:
      conditions:
        - model: vulns
          where: ""
  - command: after
"#,
        )
        .unwrap();
        let store = SnapshotStore::empty();
        let mut sink = RecordingSink::new();

        let report = engine().run(&doc, RuntimeContext::new(&store, &mut sink));

        assert!(report.is_completed());
        assert_eq!(report.steps[0].state, StepState::Skipped);
        assert_eq!(report.steps[0].label, "guarded");
        assert!(report.steps[0].guard.is_some());
        assert_eq!(report.dispatched(), vec!["after"]);
    }

    #[test]
    fn test_skipped_step_does_not_resolve_template() {
        let doc = parse_document(
            r#"
steps:
  - command: "{{UNSET}}"
    run_if:
      conditions:
        - model: hosts
          where: ""
"#,
        )
        .unwrap();
        let store = SnapshotStore::empty();
        let mut sink = RecordingSink::new();

        let report = engine().run(&doc, RuntimeContext::new(&store, &mut sink));

        assert!(report.is_completed());
        assert_eq!(report.count(StepState::Skipped), 1);
    }

    #[test]
    fn test_step_state_display() {
        assert_eq!(StepState::Executed.to_string(), "executed");
        assert_eq!(StepState::Pending.to_string(), "pending");
    }

    #[test]
    fn test_default_settle_interval() {
        assert_eq!(Engine::default().settle, DEFAULT_SETTLE);
    }

    #[test]
    fn test_settle_after_each_dispatch() {
        let doc = parse_document("steps:\n  - command: a\n  - command: b\n").unwrap();
        let store = SnapshotStore::empty();
        let mut sink = RecordingSink::new();

        let started = std::time::Instant::now();
        let ctx = RuntimeContext::new(&store, &mut sink);
        let report = Engine::new(Duration::from_millis(20)).run(&doc, ctx);

        assert!(report.is_completed());
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
