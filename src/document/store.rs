//! Task file storage
//!
//! The task store owns the directory holding task definition files. It lists
//! them, resolves user-supplied paths against it and writes new documents.

use crate::document::parse::parse_document_file;
use crate::document::types::TaskDocument;
use crate::error::{StoreError, StoreResult};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};

/// Description shown by `list` for files that fail to parse
pub const PARSE_ERROR_MARKER: &str = "Error parsing file.";

/// Description shown by `list` for documents without one
pub const NO_DESCRIPTION: &str = "N/A";

/// Extensions recognized as task files
pub const TASK_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// One row of a task listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// File name within the task directory
    pub file_name: String,

    /// Document description, or a marker
    pub description: String,

    /// Whether the file parsed as a valid task document
    pub valid: bool,
}

/// Directory of task definition files
#[derive(Debug, Clone)]
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    /// Create a store over `dir` without touching the filesystem
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TaskStore { dir: dir.into() }
    }

    /// Create a store over `dir`, creating the directory if absent
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(TaskStore { dir })
    }

    /// The task directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List every task file in the directory, sorted by file name
    ///
    /// Files that fail to parse are still listed, with
    /// [`PARSE_ERROR_MARKER`] as their description.
    pub fn list(&self) -> StoreResult<Vec<TaskEntry>> {
        let matcher = task_file_matcher();
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut files: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .map(|name| matcher.is_match(name))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        let entries = files
            .into_iter()
            .map(|path| {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();

                match parse_document_file(&path) {
                    Ok(doc) => TaskEntry {
                        file_name,
                        description: doc
                            .description
                            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                        valid: true,
                    },
                    Err(e) => {
                        tracing::debug!(file = %path.display(), error = %e, "task file failed to parse");
                        TaskEntry {
                            file_name,
                            description: PARSE_ERROR_MARKER.to_string(),
                            valid: false,
                        }
                    }
                }
            })
            .collect();

        Ok(entries)
    }

    /// Resolve a user-supplied path, first as given, then inside the task directory
    pub fn resolve(&self, path: Option<&str>) -> StoreResult<PathBuf> {
        let path = path.filter(|p| !p.is_empty()).ok_or(StoreError::MissingPath)?;

        let direct = PathBuf::from(path);
        if direct.exists() {
            return Ok(direct);
        }

        let in_dir = self.dir.join(path);
        if in_dir.exists() {
            return Ok(in_dir);
        }

        Err(StoreError::NotFound(path.to_string()))
    }

    /// Serialize `document` to `path`, creating parent directories as needed
    pub fn write(&self, path: &Path, document: &TaskDocument) -> StoreResult<()> {
        let yaml = serde_yaml::to_string(document)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, yaml).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(file = %path.display(), "task document written");
        Ok(())
    }
}

/// Append the default extension unless the name already has a recognized one
pub fn with_task_extension(file_name: &str) -> String {
    let has_extension = TASK_EXTENSIONS
        .iter()
        .any(|ext| file_name.ends_with(&format!(".{}", ext)));

    if has_extension {
        file_name.to_string()
    } else {
        format!("{}.{}", file_name, TASK_EXTENSIONS[0])
    }
}

fn task_file_matcher() -> GlobMatcher {
    let pattern = format!("*.{{{}}}", TASK_EXTENSIONS.join(","));
    match Glob::new(&pattern) {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => unreachable!("task file pattern '{}' is invalid: {}", pattern, e),
    }
}
