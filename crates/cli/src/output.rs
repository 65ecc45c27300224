//! Terminal output utilities
//!
//! Human output goes through [`Status`]; `--json` output goes through
//! [`Output`], which prints one JSON document per command on stdout.

use owo_colors::OwoColorize;
use repokit_core::error::Error;
use serde::Serialize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print an indented `label: value` line
    pub fn field(label: &str, value: &str) {
        println!("  {} {}", format!("{label}:").dimmed(), value);
    }

    /// Print an indented bullet
    pub fn item(message: &str) {
        println!("  {} {}", "•".cyan(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Output mode selected by the global `--json` flag
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print JSON instead of human-readable text
    pub json: bool,
}

impl Output {
    /// Create an output handle
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or run `human` to print it as text
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) {
        if self.json {
            match serde_json::to_string_pretty(value) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => Status::error(&format!("Failed to serialize output: {e}")),
            }
        } else {
            human(value);
        }
    }

    /// Report an error and return the process exit code for it
    pub fn fail(&self, error: &Error) -> i32 {
        if self.json {
            let report = error.to_report();
            match serde_json::to_string_pretty(&report) {
                Ok(rendered) => println!("{rendered}"),
                Err(_) => Status::error(&error.to_string()),
            }
        } else {
            Status::error(&error.to_string());
        }
        error.code.exit_code()
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else {
        format!("{:.1}s", secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Join display values with `, `, or `none` when empty
pub fn format_list<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    let joined: Vec<String> = items.into_iter().map(|i| i.to_string()).collect();
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined.join(", ")
    }
}
