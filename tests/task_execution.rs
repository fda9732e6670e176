//! Integration tests for task execution

mod common;

use common::SNAPSHOT;
use std::collections::HashMap;
use std::time::Duration;
use taskchain::datastore::SnapshotStore;
use taskchain::document::parse_document;
use taskchain::error::{ConditionError, InterpolationError};
use taskchain::runner::{
    merge_variables, resolve_overrides, Engine, RecordingSink, RunOutcome, RunReport,
    RuntimeContext, StepState,
};

fn run(yaml: &str, overrides: HashMap<String, String>) -> (RunReport, Vec<String>) {
    let doc = parse_document(yaml).unwrap();
    let store = SnapshotStore::from_yaml(SNAPSHOT).unwrap();
    let mut sink = RecordingSink::new();

    let vars = merge_variables(&doc.variables, &overrides);
    let ctx = RuntimeContext::new(&store, &mut sink).with_vars(vars);
    let report = Engine::new(Duration::ZERO).run(&doc, ctx);

    (report, sink.commands().to_vec())
}

#[test]
fn test_unguarded_steps_dispatch_in_order() {
    let (report, commands) = run(
        r#"
steps:
  - command: workspace -a lab
  - command: db_nmap 10.0.0.0/24
  - command: hosts
"#,
        HashMap::new(),
    );

    assert!(report.is_completed());
    assert_eq!(commands, vec!["workspace -a lab", "db_nmap 10.0.0.0/24", "hosts"]);
    assert_eq!(report.dispatched(), commands);
    assert_eq!(report.count(StepState::Executed), 3);
}

#[test]
fn test_overrides_win_over_defaults() {
    let mut args: Vec<String> = ["scan.yml", "--vars", "RHOSTS=\"10.1.1.1 10.1.1.2\" PORTS=445"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let overrides = resolve_overrides(&mut args);
    assert_eq!(args, vec!["scan.yml"]);

    let (report, commands) = run(
        r#"
vars:
  RHOSTS: 10.0.0.0/24
  PORTS: 1-1024
  THREADS: 4
steps:
  - command: db_nmap -p {{PORTS}} {{RHOSTS}} --threads {{THREADS}}
"#,
        overrides,
    );

    assert!(report.is_completed());
    assert_eq!(
        commands,
        vec!["db_nmap -p 445 10.1.1.1 10.1.1.2 --threads 4"]
    );
}

#[test]
fn test_undefined_variable_aborts_the_run() {
    let (report, commands) = run(
        r#"
steps:
  - command: echo first
  - command: exploit {{UNSET}}
  - command: echo never
"#,
        HashMap::new(),
    );

    assert_eq!(commands, vec!["echo first"]);
    assert_eq!(
        report.outcome,
        RunOutcome::Aborted {
            step: 1,
            reason: InterpolationError::UndefinedVariable("UNSET".to_string()),
        }
    );
    assert_eq!(report.steps[1].state, StepState::Failed);
    assert_eq!(report.steps[2].state, StepState::Pending);
}

#[test]
fn test_and_guard_needs_every_condition() {
    let (report, commands) = run(
        r#"
steps:
  - name: Windows with creds
    command: psexec
    run_if:
      logic: AND
      conditions:
        - model: hosts
          where: "os_name = 'Windows'"
        - model: creds
          where: ""
  - command: echo after
"#,
        HashMap::new(),
    );

    assert_eq!(commands, vec!["echo after"]);
    assert_eq!(report.steps[0].state, StepState::Skipped);

    let guard = report.steps[0].guard.as_ref().unwrap();
    assert!(!guard.met);
    assert_eq!(guard.conditions.len(), 2);
    assert!(guard.conditions[0].is_met());
    assert!(!guard.conditions[1].is_met());
}

#[test]
fn test_or_guard_needs_any_condition() {
    let (report, commands) = run(
        r#"
steps:
  - command: smb_version
    run_if:
      logic: or
      conditions:
        - model: vulns
          where: "name LIKE '%ms17%'"
        - model: services
          where: "port = 445 AND state = 'open'"
"#,
        HashMap::new(),
    );

    assert!(report.is_completed());
    assert_eq!(commands, vec!["smb_version"]);
    let guard = report.steps[0].guard.as_ref().unwrap();
    assert!(guard.met);
    assert!(!guard.conditions[0].is_met());
    assert!(guard.conditions[1].is_met());
}

#[test]
fn test_bad_conditions_skip_without_aborting() {
    let (report, commands) = run(
        r#"
steps:
  - command: loot
    run_if:
      conditions:
        - model: loot
          where: ""
  - command: broken
    run_if:
      conditions:
        - model: hosts
          where: "os_name = = 'x'"
  - command: echo still running
"#,
        HashMap::new(),
    );

    assert!(report.is_completed());
    assert_eq!(commands, vec!["echo still running"]);

    let unknown = &report.steps[0].guard.as_ref().unwrap().conditions[0];
    assert_eq!(
        unknown.result,
        Err(ConditionError::InvalidModel("loot".to_string()))
    );

    let malformed = &report.steps[1].guard.as_ref().unwrap().conditions[0];
    assert!(matches!(
        malformed.result,
        Err(ConditionError::MalformedFilter { .. })
    ));
}

#[test]
fn test_placeholder_values_are_not_rescanned() {
    let mut overrides = HashMap::new();
    overrides.insert("A".to_string(), "{{B}}".to_string());

    let (report, commands) = run("steps:\n  - command: echo {{A}}\n", overrides);

    assert!(report.is_completed());
    assert_eq!(commands, vec!["echo {{B}}"]);
}

#[test]
fn test_incomplete_condition_skips_only_its_step() {
    let (report, commands) = run(
        r#"
steps:
  - command: no_where
    run_if:
      conditions:
        - model: hosts
          where:
  - command: numeric_model
    run_if:
      conditions:
        - model: 7
          where: ""
  - command: echo done
"#,
        HashMap::new(),
    );

    assert!(report.is_completed());
    assert_eq!(commands, vec!["echo done"]);
    assert_eq!(report.count(StepState::Skipped), 2);

    let missing = &report.steps[0].guard.as_ref().unwrap().conditions[0];
    assert!(matches!(
        missing.result,
        Err(ConditionError::MalformedFilter { .. })
    ));
    let numeric = &report.steps[1].guard.as_ref().unwrap().conditions[0];
    assert_eq!(
        numeric.result,
        Err(ConditionError::InvalidModel("7".to_string()))
    );
}
