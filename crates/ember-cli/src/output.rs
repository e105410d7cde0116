// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI output styling.
//!
//! Respects NO_COLOR and FORCE_COLOR. Colors are disabled automatically when
//! output is piped.

use colored::{ColoredString, Colorize};

/// Initialize color support from the environment. Call once at startup.
pub fn init() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn banner_ok(phase: &str) -> String {
    format!(
        "{} {} {}",
        "===".dimmed(),
        format!("{} OK", phase).green().bold(),
        "===".dimmed()
    )
}

pub fn banner_fail(phase: &str, count: usize) -> String {
    let msg = if count == 1 {
        format!("{} FAILED: 1 error", phase)
    } else {
        format!("{} FAILED: {} errors", phase, count)
    };
    format!("{} {} {}", "===".dimmed(), msg.red().bold(), "===".dimmed())
}

pub fn command_name(name: &str) -> ColoredString {
    name.green()
}

pub fn file_path(path: &str) -> ColoredString {
    path.cyan()
}

pub fn section_header(title: &str) -> ColoredString {
    title.yellow().bold()
}
