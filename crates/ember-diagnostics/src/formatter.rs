// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! ```text
//! error[E0201]: block has no terminator
//!   --> program.json: @main, block `then`
//!    = note: conditionals do not join back up; each branch must end in a return
//! ```

use colored::Colorize;

use crate::{Diagnostic, Severity};

const GUTTER: usize = 2;

/// Formats diagnostics for terminal output.
#[derive(Debug, Default)]
pub struct DiagnosticFormatter<'a> {
    file_name: Option<&'a str>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);
        self.format_location(&mut out, diagnostic);
        self.format_footer(&mut out, diagnostic);
        out
    }

    /// Format a batch, followed by a one-line tally.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diag in diagnostics {
            out.push_str(&self.format(diag));
            out.push('\n');
        }
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        if errors > 0 {
            let noun = if errors == 1 { "error" } else { "errors" };
            out.push_str(&format!("{}: {} {} emitted\n", "error".red().bold(), errors, noun));
        }
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };

        if let Some(ref code) = diagnostic.code {
            out.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code.0.clone().red().bold(),
                diagnostic.message.bold()
            ));
        } else {
            out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold()));
        }
    }

    fn format_location(&self, out: &mut String, diagnostic: &Diagnostic) {
        let place = match (self.file_name, diagnostic.location.as_deref()) {
            (Some(file), Some(loc)) => format!("{}: {}", file, loc),
            (Some(file), None) => file.to_string(),
            (None, Some(loc)) => loc.to_string(),
            (None, None) => return,
        };
        out.push_str(&format!("{:width$}{} {}\n", "", "-->".blue(), place, width = GUTTER));
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic) {
        let pad = " ".repeat(GUTTER + 1);
        for note in &diagnostic.notes {
            out.push_str(&format!("{} {} {}: {}\n", pad, "=".cyan(), "note".cyan().bold(), note));
        }
        if let Some(ref help) = diagnostic.help {
            out.push_str(&format!("{} {} {}: {}\n", pad, "=".cyan(), "help".green().bold(), help));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn full_diagnostic_layout() {
        let diag = Diagnostic::error("block has no terminator")
            .with_code("E0201")
            .with_location("@main, block `then`")
            .with_note("each branch must end in a return")
            .with_help("add a return");
        let text = plain(|| DiagnosticFormatter::new().with_file_name("p.json").format(&diag));
        assert_eq!(
            text,
            "error[E0201]: block has no terminator\n\
             \x20 --> p.json: @main, block `then`\n\
             \x20   = note: each branch must end in a return\n\
             \x20   = help: add a return\n"
        );
    }

    #[test]
    fn tally_counts_errors_only() {
        let diags = [
            Diagnostic::error("a"),
            Diagnostic::warning("b"),
            Diagnostic::error("c"),
        ];
        let text = plain(|| DiagnosticFormatter::new().format_all(&diags));
        assert!(text.starts_with("error: a\n\nwarning: b\n\nerror: c\n\n"));
        assert!(text.ends_with("error: 2 errors emitted\n"));
    }
}
