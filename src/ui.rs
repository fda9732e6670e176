//! Console output
//!
//! Everything the user sees goes through [`Console`], which applies the
//! verbosity level chosen on the command line. Diagnostics that are only
//! interesting when debugging go to `tracing` instead.

use colored::Colorize;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

/// Width of separator lines
const RULE_WIDTH: usize = 50;

/// Verbosity-aware printer for user-facing messages
#[derive(Debug, Clone, Copy)]
pub struct Console {
    pub verbosity: Verbosity,
}

impl Console {
    pub fn new(verbosity: Verbosity) -> Self {
        Console { verbosity }
    }

    /// A console that prints nothing
    pub fn silent() -> Self {
        Self::new(Verbosity::Silent)
    }

    /// Print a plain line
    pub fn print_line(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            println!("{}", message);
        }
    }

    /// Print a horizontal rule
    pub fn print_rule(&self) {
        self.print_line(&"-".repeat(RULE_WIDTH));
    }

    /// Print a progress message
    pub fn print_status(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            println!("{} {}", "[*]".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn print_good(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            println!("{} {}", "[+]".green().bold(), message);
        }
    }

    /// Print a warning
    pub fn print_warning(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[!]".yellow().bold(), message);
        }
    }

    /// Print an error message
    pub fn print_error(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[-]".red().bold(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Print a titled two-column table
    pub fn print_table(&self, title: &str, headers: [&str; 2], rows: &[(String, String)]) {
        if self.verbosity < Verbosity::Normal {
            return;
        }
        for line in render_table(title, headers, rows) {
            println!("{}", line);
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}

/// Lay out a two-column table as plain text lines
pub fn render_table(title: &str, headers: [&str; 2], rows: &[(String, String)]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|(left, _)| left.chars().count())
        .chain(std::iter::once(headers[0].chars().count()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(rows.len() + 4);
    if !title.is_empty() {
        lines.push(title.to_string());
        lines.push("=".repeat(title.chars().count()));
        lines.push(String::new());
    }
    lines.push(format!("  {:<width$}  {}", headers[0], headers[1], width = width));
    lines.push(format!(
        "  {:<width$}  {}",
        "-".repeat(headers[0].chars().count()),
        "-".repeat(headers[1].chars().count()),
        width = width
    ));
    for (left, right) in rows {
        lines.push(format!("  {:<width$}  {}", left, right, width = width));
    }
    lines
}
