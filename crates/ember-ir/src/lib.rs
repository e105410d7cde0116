// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Ember IR - SSA control-flow graph of typed instructions.
//!
//! This is the backend surface the lowering engine builds against: modules
//! own functions and global strings, functions own blocks and instructions.
//! Blocks are plain instruction lists; a terminator is an instruction like any
//! other, so a block can be left unterminated (or terminated twice) while it
//! is being built. [`verify`] reports such problems after the fact.

mod builder;
mod display;
mod function;
mod inst;
mod module;
mod types;
mod verify;

pub use builder::InstBuilder;
pub use function::{BlockData, BlockId, Function, InstId, Linkage, Signature};
pub use inst::{BinaryOp, FloatPredicate, InstData, InstKind};
pub use module::{FuncId, GlobalId, GlobalString, Module};
pub use types::{Constant, IrType, Value};
pub use verify::{verify, VerifyError, VerifyErrorKind};

use thiserror::Error;

/// Misuse of the IR construction API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IrError {
    #[error("value {0} is not a phi")]
    NotAPhi(String),
}
