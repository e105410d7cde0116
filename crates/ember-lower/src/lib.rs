// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! AST → IR lowering.
//!
//! [`lower_program`] builds a whole module from a root block: the output
//! helper, every declared function, and the entry function wrapping the
//! top-level statements. [`Lowerer`] is the per-node engine underneath it.

mod assemble;
mod error;
mod options;
mod scope;

pub mod lower;

pub use assemble::{emit_runtime_helper, lower_program, Lowered};
pub use error::{ErrorPolicy, LowerError, LowerResult};
pub use lower::{literal_text, type_of, Lowerer};
pub use options::LowerOptions;
pub use scope::{Cursor, DeclId, DeclInfo, DeclKind, Scope, ScopeStack};
