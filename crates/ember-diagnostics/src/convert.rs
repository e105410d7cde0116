// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from compiler error types to `Diagnostic`.

use crate::{suggestions::did_you_mean, Diagnostic, ToDiagnostic};
use ember_codegen::CodegenError;
use ember_ir::{Module, VerifyError, VerifyErrorKind};
use ember_lower::LowerError;

// ============================================================================
// Lowering Errors
// ============================================================================

impl ToDiagnostic for LowerError {
    fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            LowerError::UnresolvedIdentifier { .. } => diag
                .with_code("E0101")
                .with_note("branch and loop bodies see a copy of the enclosing scope; names declared inside them end with the body"),
            LowerError::UndeclaredAssignment { name } => diag
                .with_code("E0102")
                .with_help(format!("declare it first, e.g. `int {} = ...`", name)),
            LowerError::NotAssignable { .. } => diag
                .with_code("E0103")
                .with_note("parameters and the loop counter are values, not variables"),
            LowerError::UnknownCallee { .. } => diag.with_code("E0104"),
            LowerError::ArityMismatch { .. } => diag.with_code("E0105"),
            LowerError::UnsupportedOperator { .. } => diag
                .with_code("E0106")
                .with_note("supported operators: + - * / < >"),
            LowerError::MissingValue { .. } => diag.with_code("E0107"),
            LowerError::ScopeUnderflow | LowerError::NoActiveScope | LowerError::Ir(_) => diag
                .with_code("E0190")
                .with_note("this is a bug in the compiler, not in the program"),
        }
    }
}

/// Like [`ToDiagnostic::to_diagnostic`], with suggestions drawn from the
/// functions of the module the error was found in.
pub fn lower_error_in_module(err: &LowerError, module: &Module) -> Diagnostic {
    let diag = err.to_diagnostic();
    match err {
        LowerError::UnknownCallee { name } => {
            let candidates = module.functions().map(|(_, f)| f.name.as_str());
            match did_you_mean(name, candidates) {
                Some(help) => diag.with_help(help),
                None => diag,
            }
        }
        _ => diag,
    }
}

// ============================================================================
// Verifier Errors
// ============================================================================

impl ToDiagnostic for VerifyError {
    fn to_diagnostic(&self) -> Diagnostic {
        use VerifyErrorKind::*;

        let code = match &self.kind {
            MissingTerminator => "E0201",
            InstructionAfterTerminator => "E0202",
            MisplacedPhi => "E0203",
            OperandType { .. } => "E0204",
            NotAPointer { .. } => "E0205",
            StoreType { .. } => "E0206",
            VoidSlot => "E0207",
            CallArity { .. } => "E0208",
            CallArgType { .. } => "E0209",
            ReturnType { .. } => "E0210",
            ConditionType(_) => "E0211",
            PhiType { .. } => "E0212",
        };
        let diag = Diagnostic::error(self.kind.to_string())
            .with_code(code)
            .with_location(format!("@{}, block `{}`", self.function, self.block));

        match &self.kind {
            MissingTerminator => diag.with_note(
                "conditionals do not join back up; each branch must end in a return",
            ),
            InstructionAfterTerminator => diag.with_note(
                "code after a loop or conditional is emitted into the block that branches away",
            ),
            _ => diag,
        }
    }
}

// ============================================================================
// Codegen Errors
// ============================================================================

impl ToDiagnostic for CodegenError {
    fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            CodegenError::InvalidModule(_) => "E0301",
            CodegenError::Unsupported(_) => "E0302",
            CodegenError::FunctionNotFound(_) => "E0303",
            CodegenError::UnknownTarget(_) => "E0304",
            CodegenError::Cranelift(_) => "E0305",
            CodegenError::Io(_) => "E0306",
        };
        let diag = Diagnostic::error(self.to_string()).with_code(code);
        match self {
            CodegenError::InvalidModule(_) => diag.with_help("run `ember check` to list the problems"),
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_ast::BinOp;
    use ember_ir::IrType;

    fn code(diag: &Diagnostic) -> &str {
        diag.code.as_ref().map(|c| c.0.as_str()).unwrap_or("")
    }

    #[test]
    fn lowering_errors_keep_their_message() {
        let diag = LowerError::UnresolvedIdentifier { name: "x".into() }.to_diagnostic();
        assert_eq!(code(&diag), "E0101");
        assert_eq!(diag.message, "undeclared variable `x`");

        let diag = LowerError::UnsupportedOperator { op: BinOp::Le }.to_diagnostic();
        assert_eq!(code(&diag), "E0106");
        assert_eq!(diag.message, "unsupported binary operator `<=`");

        assert_eq!(code(&LowerError::ScopeUnderflow.to_diagnostic()), "E0190");
    }

    #[test]
    fn unknown_callee_suggests_a_close_function() {
        let mut module = Module::new("m");
        module.add_function(
            "println",
            ember_ir::Signature::new(vec![IrType::Str], IrType::Void),
            ember_ir::Linkage::Private,
        );
        let err = LowerError::UnknownCallee { name: "printn".into() };
        let diag = lower_error_in_module(&err, &module);
        assert_eq!(code(&diag), "E0104");
        assert_eq!(diag.help.as_deref(), Some("did you mean `println`?"));
    }

    #[test]
    fn verifier_errors_carry_their_location() {
        let err = VerifyError {
            function: "f".into(),
            block: "then".into(),
            kind: VerifyErrorKind::MissingTerminator,
        };
        let diag = err.to_diagnostic();
        assert_eq!(code(&diag), "E0201");
        assert_eq!(diag.location.as_deref(), Some("@f, block `then`"));
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn codegen_errors_have_codes() {
        let diag = CodegenError::InvalidModule(2).to_diagnostic();
        assert_eq!(code(&diag), "E0301");
        assert!(diag.help.is_some());
        let diag = CodegenError::UnknownTarget("z80".into()).to_diagnostic();
        assert_eq!(code(&diag), "E0304");
    }
}
