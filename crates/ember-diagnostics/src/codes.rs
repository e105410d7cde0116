// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (E0101, E0201, etc.) to titles and categories.

use std::collections::HashMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lowering,
    Internal,
    Verification,
    Codegen,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Lowering => write!(f, "Lowering"),
            ErrorCategory::Internal => write!(f, "Internal"),
            ErrorCategory::Verification => write!(f, "Verification"),
            ErrorCategory::Codegen => write!(f, "Codegen"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lowering errors (E01xx)
                "E0101" => ("undeclared variable", Lowering),
                "E0102" => ("assignment to undeclared variable", Lowering),
                "E0103" => ("assignment target is not a variable", Lowering),
                "E0104" => ("no such function", Lowering),
                "E0105" => ("wrong number of arguments", Lowering),
                "E0106" => ("unsupported binary operator", Lowering),
                "E0107" => ("expression produced no value", Lowering),
                "E0190" => ("internal lowering fault", Internal),

                // Verifier errors (E02xx)
                "E0201" => ("block has no terminator", Verification),
                "E0202" => ("instruction after terminator", Verification),
                "E0203" => ("misplaced phi", Verification),
                "E0204" => ("operand type mismatch", Verification),
                "E0205" => ("operand is not a pointer", Verification),
                "E0206" => ("stored value does not fit the slot", Verification),
                "E0207" => ("void stack slot", Verification),
                "E0208" => ("call arity mismatch", Verification),
                "E0209" => ("call argument type mismatch", Verification),
                "E0210" => ("return type mismatch", Verification),
                "E0211" => ("branch condition is not i1", Verification),
                "E0212" => ("phi input type mismatch", Verification),

                // Codegen errors (E03xx)
                "E0301" => ("module failed verification", Codegen),
                "E0302" => ("unsupported construct", Codegen),
                "E0303" => ("function not found", Codegen),
                "E0304" => ("unknown target", Codegen),
                "E0305" => ("cranelift error", Codegen),
                "E0306" => ("cannot write object file", Codegen),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_phase_prefix() {
        let registry = ErrorCodeRegistry::default();
        for info in registry.all() {
            let expected = match &info.code[..3] {
                "E01" if info.code == "E0190" => ErrorCategory::Internal,
                "E01" => ErrorCategory::Lowering,
                "E02" => ErrorCategory::Verification,
                "E03" => ErrorCategory::Codegen,
                other => panic!("unexpected prefix {other}"),
            };
            assert_eq!(info.category, expected, "{}", info.code);
        }
        assert_eq!(registry.get("E0104").map(|i| i.title), Some("no such function"));
        assert!(registry.get("E9999").is_none());
    }
}
