// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Use `--json` with `ember check` to get this output.

use serde::Serialize;

use crate::{codes::ErrorCodeRegistry, Diagnostic, Severity};

/// A complete JSON diagnostic report for one run.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The input that was compiled.
    pub file: String,
    /// Whether the run succeeded (no errors).
    pub success: bool,
    /// The phase that produced these diagnostics.
    pub phase: String,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// "error", "warning", or "note".
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Category from the code registry, e.g. "Lowering".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Registry title for the code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Convert diagnostics to a structured JSON report.
pub fn to_json_report(diagnostics: &[Diagnostic], file: &str, phase: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();

    let diagnostics = diagnostics
        .iter()
        .map(|d| {
            let code = d.code.as_ref().map(|c| c.0.clone());
            let info = code.as_deref().and_then(|c| registry.get(c));
            JsonDiagnostic {
                severity: d.severity,
                category: info.map(|i| i.category.to_string()),
                title: info.map(|i| i.title.to_string()),
                code,
                message: d.message.clone(),
                location: d.location.clone(),
                notes: d.notes.clone(),
                help: d.help.clone(),
            }
        })
        .collect();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        phase: phase.to_string(),
        diagnostics,
        error_count,
        warning_count,
    }
}

/// Serialize a diagnostic report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_and_enriches() {
        let diags = [
            Diagnostic::error("undeclared variable `y`").with_code("E0101"),
            Diagnostic::warning("odd"),
        ];
        let report = to_json_report(&diags, "p.json", "lower");
        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);

        let value: serde_json::Value = serde_json::from_str(&to_json_string(&report)).unwrap();
        let first = &value["diagnostics"][0];
        assert_eq!(first["severity"], "error");
        assert_eq!(first["code"], "E0101");
        assert_eq!(first["category"], "Lowering");
        assert_eq!(first["title"], "undeclared variable");
        assert!(first.get("help").is_none());
        assert!(value["diagnostics"][1].get("code").is_none());
    }

    #[test]
    fn empty_report_is_success() {
        let report = to_json_report(&[], "p.json", "check");
        assert!(report.success);
        assert!(report.diagnostics.is_empty());
    }
}
