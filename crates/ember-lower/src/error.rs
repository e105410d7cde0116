// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lowering error types.

use ember_ast::BinOp;
use ember_ir::IrError;
use thiserror::Error;

/// A problem found while lowering one node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LowerError {
    #[error("undeclared variable `{name}`")]
    UnresolvedIdentifier { name: String },

    #[error("assignment to undeclared variable `{name}`")]
    UndeclaredAssignment { name: String },

    #[error("`{name}` is a {what}, not a variable that can be assigned")]
    NotAssignable { name: String, what: &'static str },

    #[error("no such function `{name}`")]
    UnknownCallee { name: String },

    #[error("function `{name}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("unsupported binary operator `{op}`")]
    UnsupportedOperator { op: BinOp },

    #[error("{context} produced no value")]
    MissingValue { context: &'static str },

    #[error("scope stack underflow")]
    ScopeUnderflow,

    #[error("no open scope")]
    NoActiveScope,

    #[error(transparent)]
    Ir(#[from] IrError),
}

impl LowerError {
    /// Faults in the engine itself rather than in the program being lowered.
    /// These abort lowering under every policy.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LowerError::ScopeUnderflow | LowerError::NoActiveScope | LowerError::Ir(_)
        )
    }
}

pub type LowerResult<T> = Result<T, LowerError>;

/// What to do when a statement fails to lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Record the error, skip the statement, continue with its siblings.
    #[default]
    BestEffort,
    /// Stop at the first error.
    FailFast,
}
