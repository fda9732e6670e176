//! Main CLI application

use crate::cli::dispatch::{Dispatcher, Registry, Status};
use crate::cli::module::TaskModule;
use crate::cli::prompt::StdinPrompt;
use crate::datastore::{DataStore, SnapshotStore};
use crate::document::TaskStore;
use crate::logging;
use crate::runner::{CommandSink, Engine, PrintSink, ShellSink};
use crate::settings::Settings;
use crate::ui::{Console, Verbosity};
use anyhow::Context as _;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// CLI application
pub struct App {
    settings: Settings,
    verbosity: Verbosity,
    dry_run: bool,
    args: Vec<String>,
}

impl App {
    /// Build the application from command line arguments and the environment
    pub fn from_args<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = build_command().try_get_matches_from(argv)?;
        let verbosity = get_verbosity(&matches);
        logging::init(verbosity);

        let settings = apply_flags(Settings::from_env(), &matches);

        Ok(App {
            settings,
            verbosity,
            dry_run: matches.get_flag("dry-run"),
            args: matches
                .get_many::<String>("args")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        })
    }

    /// Run the requested action
    pub fn run(self) -> anyhow::Result<Status> {
        let console = Console::new(self.verbosity);

        let store = TaskStore::open(&self.settings.task_dir).with_context(|| {
            format!(
                "cannot prepare task directory '{}'",
                self.settings.task_dir.display()
            )
        })?;

        let data: Box<dyn DataStore> = match &self.settings.store_path {
            Some(path) => Box::new(
                SnapshotStore::load(path).context("cannot open the data store snapshot")?,
            ),
            None => Box::new(SnapshotStore::empty()),
        };

        let sink: Box<dyn CommandSink> = if self.dry_run {
            Box::new(PrintSink)
        } else {
            let mut shell = ShellSink::new().with_interpreter(self.settings.interpreter.clone());
            if let Ok(dir) = env::current_dir() {
                shell = shell.with_working_dir(dir);
            }
            Box::new(shell)
        };

        let module = TaskModule::new(
            store,
            Engine::new(self.settings.settle),
            data,
            sink,
            Box::new(StdinPrompt),
            console,
        );

        let registry = Registry::new().with(Box::new(module));
        let mut dispatcher = Dispatcher::new(registry, console).with_default_module("task");

        Ok(dispatcher.dispatch(self.args))
    }
}

/// Build the clap command
fn build_command() -> Command {
    Command::new("taskchain")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs chains of commands described in YAML task files")
        .arg(
            Arg::new("task-dir")
                .short('d')
                .long("task-dir")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Directory holding task files"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("YAML snapshot of hosts, services, vulns and creds for run_if checks"),
        )
        .arg(
            Arg::new("settle-ms")
                .long("settle-ms")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64))
                .help("Pause after each dispatched command, in milliseconds"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print resolved commands instead of running them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("args")
                .value_name("ACTION")
                .help("[task] run <file> [--vars \"K=V ...\"] | list | show <file> | define | help")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Command line flags take precedence over the environment
fn apply_flags(mut settings: Settings, matches: &ArgMatches) -> Settings {
    if let Some(dir) = matches.get_one::<PathBuf>("task-dir") {
        settings.task_dir = dir.clone();
    }
    if let Some(store) = matches.get_one::<PathBuf>("store") {
        settings.store_path = Some(store.clone());
    }
    if let Some(ms) = matches.get_one::<u64>("settle-ms") {
        settings.settle = Duration::from_millis(*ms);
    }
    settings
}

/// Run the CLI application with the process arguments
pub fn run() -> anyhow::Result<Status> {
    let app = match App::from_args(env::args_os()) {
        Ok(app) => app,
        Err(e) => e.exit(),
    };
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(argv: &[&str]) -> ArgMatches {
        build_command().try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn test_get_verbosity_normal() {
        assert_eq!(get_verbosity(&matches(&["taskchain"])), Verbosity::Normal);
        assert_eq!(get_verbosity(&matches(&["taskchain", "-v"])), Verbosity::Verbose);
        assert_eq!(get_verbosity(&matches(&["taskchain", "-q", "-v"])), Verbosity::Quiet);
    }

    #[test]
    fn test_vars_flag_passes_through() {
        let m = matches(&["taskchain", "run", "scan.yml", "--vars", "A=1 B=2"]);
        let args: Vec<&String> = m.get_many::<String>("args").unwrap().collect();
        assert_eq!(args, vec!["run", "scan.yml", "--vars", "A=1 B=2"]);
    }

    #[test]
    fn test_flags_override_settings() {
        let m = matches(&[
            "taskchain",
            "--task-dir",
            "/tmp/t",
            "--store",
            "db.yml",
            "--settle-ms",
            "5",
            "list",
        ]);
        let settings = apply_flags(Settings::from_lookup(|_| None), &m);

        assert_eq!(settings.task_dir, PathBuf::from("/tmp/t"));
        assert_eq!(settings.store_path, Some(PathBuf::from("db.yml")));
        assert_eq!(settings.settle, Duration::from_millis(5));
    }
}
