//! Integration tests for task documents and the task directory

mod common;

use common::{create_task_dir, create_task_file};
use taskchain::cli::{ScriptedPrompt, Wizard, WizardOutcome};
use taskchain::document::{
    parse_document, parse_document_file, Logic, TaskStore, NO_DESCRIPTION, PARSE_ERROR_MARKER,
};
use taskchain::error::{DocumentError, StoreError};
use taskchain::ui::Console;

#[test]
fn test_parse_full_document() {
    let (_dir, path) = create_task_file(
        "recon.yml",
        r#"
name: Recon
author: ops
description: Sweep and probe
vars:
  RHOSTS: 10.0.0.0/24
  THREADS: 8
steps:
  - name: Sweep
    command: db_nmap -sS {{RHOSTS}}
  - name: SMB check
    description: only when SMB is open
    command: use auxiliary/scanner/smb/smb_version
    run_if:
      logic: OR
      conditions:
        - model: services
          where: "port = 445"
        - model: services
          where: "port = 139"
"#,
    );

    let doc = parse_document_file(&path).unwrap();
    assert_eq!(doc.display_name(), "Recon");
    assert_eq!(doc.variables["THREADS"], "8");
    assert_eq!(doc.steps.len(), 2);
    assert!(doc.steps[0].run_if.is_none());

    let guard = doc.steps[1].run_if.as_ref().unwrap();
    assert_eq!(guard.logic, Logic::Or);
    assert_eq!(guard.conditions.len(), 2);
    assert_eq!(guard.conditions[0].model, "services");
}

#[test]
fn test_logic_defaults_to_and() {
    let doc = parse_document(
        r#"
steps:
  - command: exploit
    run_if:
      conditions:
        - model: hosts
          where: "os_name = 'Windows'"
"#,
    )
    .unwrap();

    assert_eq!(doc.steps[0].run_if.as_ref().unwrap().logic, Logic::And);
    assert_eq!(doc.display_name(), "Untitled Task");
}

#[test]
fn test_rejects_bad_documents() {
    assert!(matches!(
        parse_document("steps: [unclosed"),
        Err(DocumentError::Syntax(_))
    ));
    assert!(matches!(
        parse_document("name: no steps\n"),
        Err(DocumentError::Schema(_))
    ));
    assert!(matches!(
        parse_document("steps:\n  - name: missing command\n"),
        Err(DocumentError::Schema(_))
    ));
}

#[test]
fn test_list_marks_unparseable_files() {
    let dir = create_task_dir(&[
        ("b_scan.yml", "description: Port scan\nsteps:\n  - command: db_nmap\n"),
        ("a_plain.yaml", "steps:\n  - command: hosts\n"),
        ("broken.yml", "steps: [oops"),
        ("notes.txt", "not a task"),
    ]);
    let store = TaskStore::new(dir.path());

    let entries = store.list().unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(names, vec!["a_plain.yaml", "b_scan.yml", "broken.yml"]);

    assert_eq!(entries[0].description, NO_DESCRIPTION);
    assert_eq!(entries[1].description, "Port scan");
    assert_eq!(entries[2].description, PARSE_ERROR_MARKER);
    assert!(!entries[2].valid);
}

#[test]
fn test_resolve_relative_to_task_dir() {
    let (dir, path) = create_task_file("scan.yml", "steps:\n  - command: db_nmap\n");
    let store = TaskStore::new(dir.path());

    assert_eq!(store.resolve(Some("scan.yml")).unwrap(), path);
    assert!(matches!(
        store.resolve(Some("missing.yml")),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.resolve(None), Err(StoreError::MissingPath)));
}

#[test]
fn test_wizard_output_parses_back() {
    let dir = create_task_dir(&[]);
    let store = TaskStore::new(dir.path());
    let wizard = Wizard::new(&store, Console::silent());
    let mut prompt = ScriptedPrompt::new([
        "Recon",
        "ops",
        "",
        "RHOSTS",
        "10.0.0.0/24",
        "",
        "Sweep",
        "ping sweep",
        "db_nmap -sn {{RHOSTS}}",
        "",
        "recon",
        "yes",
    ]);

    let outcome = wizard.run(&mut prompt).unwrap();
    let WizardOutcome::Saved { path, document } = outcome else {
        panic!("expected the task to be saved");
    };

    assert_eq!(path, dir.path().join("recon.yml"));
    let reparsed = parse_document_file(&path).unwrap();
    assert_eq!(reparsed, document);
    assert_eq!(reparsed.steps[0].command, "db_nmap -sn {{RHOSTS}}");

    let entries = store.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].valid);
}
