//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary task directory holding one task file
pub fn create_task_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let task_path = temp_dir.path().join(name);
    fs::write(&task_path, content).unwrap();
    (temp_dir, task_path)
}

/// Create a temporary task directory holding several task files
pub fn create_task_dir(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(temp_dir.path().join(name), content).unwrap();
    }
    temp_dir
}

/// Snapshot with one Windows host, one SMB service and no vulns or creds
pub const SNAPSHOT: &str = r#"
hosts:
  - address: 10.0.0.5
    os_name: Windows
services:
  - host: 10.0.0.5
    port: 445
    name: smb
    state: open
"#;
