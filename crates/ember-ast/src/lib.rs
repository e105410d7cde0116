// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Ember language.
//!
//! The parser hands a root [`Block`] to the lowering engine. Nodes only carry
//! their own shape; lowering lives in `ember-lower` so that building a tree
//! never depends on a particular backend.

pub mod builder;
pub mod expr;
pub mod stmt;

pub use builder::AstBuilder;
pub use expr::{BinOp, Expr, ExprKind};
pub use stmt::{Block, FnDecl, Param, Stmt, StmtKind, VarDecl};

/// Unique identifier for AST nodes.
///
/// Assigned by whoever builds the tree. The lowering engine keys its
/// declaration metadata by these ids instead of holding node references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u32);
