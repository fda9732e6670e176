//! Runtime settings
//!
//! Settings come from the environment (a `.env` file in the working directory
//! is honored) and are then overridden by command line flags.
//!
//! | Variable              | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `TASKCHAIN_TASK_DIR`  | directory holding task files              |
//! | `TASKCHAIN_SETTLE_MS` | pause after each dispatched command       |
//! | `TASKCHAIN_STORE`     | YAML snapshot used as the data store      |
//! | `TASKCHAIN_SHELL`     | interpreter for commands, e.g. `bash -c`  |

use crate::runner::DEFAULT_SETTLE;
use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_TASK_DIR: &str = "TASKCHAIN_TASK_DIR";
pub const ENV_SETTLE_MS: &str = "TASKCHAIN_SETTLE_MS";
pub const ENV_STORE: &str = "TASKCHAIN_STORE";
pub const ENV_SHELL: &str = "TASKCHAIN_SHELL";

/// Effective runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding task definition files
    pub task_dir: PathBuf,

    /// Pause after each dispatched command
    pub settle: Duration,

    /// Data store snapshot; no snapshot means an empty store
    pub store_path: Option<PathBuf>,

    /// Interpreter used to run commands
    pub interpreter: Vec<String>,
}

impl Settings {
    /// Load settings from the process environment and `.env`
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(file = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(dir) = lookup(ENV_TASK_DIR).filter(|v| !v.trim().is_empty()) {
            settings.task_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_SETTLE_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => settings.settle = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_SETTLE_MS),
            }
        }

        if let Some(store) = lookup(ENV_STORE).filter(|v| !v.trim().is_empty()) {
            settings.store_path = Some(PathBuf::from(store));
        }

        if let Some(shell) = lookup(ENV_SHELL) {
            let interpreter: Vec<String> = shell.split_whitespace().map(String::from).collect();
            if !interpreter.is_empty() {
                settings.interpreter = interpreter;
            }
        }

        settings
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            task_dir: default_task_dir(),
            settle: DEFAULT_SETTLE,
            store_path: None,
            interpreter: vec!["sh".to_string(), "-c".to_string()],
        }
    }
}

/// `<user config dir>/taskchain/tasks`, or `./tasks` when there is no home
pub fn default_task_dir() -> PathBuf {
    ProjectDirs::from("", "", "taskchain")
        .map(|dirs| dirs.config_dir().join("tasks"))
        .unwrap_or_else(|| PathBuf::from("tasks"))
}
