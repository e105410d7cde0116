// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Ember compiler diagnostics.
//!
//! One diagnostic type for every phase. Lowering, verifier and codegen errors
//! are converted to `Diagnostic` via the `ToDiagnostic` trait, keeping those
//! crates free of presentation concerns.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;
pub mod suggestions;

use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

/// A compiler diagnostic ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    /// Where in the output the problem sits, e.g. a function and block.
    pub location: Option<String>,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// An error code like E0101.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            location: None,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert a compiler error into a diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_field() {
        let diag = Diagnostic::warning("odd")
            .with_code("E0999")
            .with_location("in @main")
            .with_note("first")
            .with_note("second")
            .with_help("try again");
        assert_eq!(diag.severity, Severity::Warning);
        assert!(!diag.is_error());
        assert_eq!(diag.code, Some(ErrorCode("E0999".into())));
        assert_eq!(diag.location.as_deref(), Some("in @main"));
        assert_eq!(diag.notes, ["first", "second"]);
        assert_eq!(diag.help.as_deref(), Some("try again"));
    }
}
