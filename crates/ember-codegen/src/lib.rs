// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Ember code generator - IR → native object code via Cranelift.

mod builder;
mod module;
mod tests;
mod types;

pub use module::{compile, CodeGenerator};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("module failed verification with {0} problem(s)")]
    InvalidModule(usize),
    #[error("unsupported construct: {0}")]
    Unsupported(String),
    #[error("function not found: {0}")]
    FunctionNotFound(String),
    #[error("unknown target `{0}`")]
    UnknownTarget(String),
    #[error("cranelift error: {0}")]
    Cranelift(String),
    #[error("cannot write object file: {0}")]
    Io(#[from] std::io::Error),
}

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Target triple of the machine running the compiler.
pub fn host_triple() -> String {
    target_lexicon::Triple::host().to_string()
}
