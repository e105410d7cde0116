// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement and declaration AST nodes.

use crate::expr::Expr;
use crate::NodeId;

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: NodeId,
    pub kind: StmtKind,
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    /// Expression evaluated for its side effect
    Expr(Expr),
    /// Return, with or without a value
    Return(Option<Expr>),
    /// Variable declaration
    Var(VarDecl),
    /// Function declaration
    Fn(FnDecl),
    /// Nested block
    Block(Block),
}

/// An ordered list of statements. Owns its statements.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
}

/// `<type> <name> [= <init>]`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarDecl {
    pub ty: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub init: Option<Expr>,
}

/// A function parameter: declared type and name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: NodeId,
    pub ty: String,
    pub name: String,
}

/// A function declaration. A missing return type means `void`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FnDecl {
    #[cfg_attr(feature = "serde", serde(default))]
    pub ret_ty: Option<String>,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: Vec<Param>,
    pub body: Block,
}

impl Stmt {
    pub fn new(id: NodeId, kind: StmtKind) -> Self {
        Self { id, kind }
    }

    /// True for a direct `return` statement. Does not look inside nested
    /// blocks or expressions.
    pub fn is_return(&self) -> bool {
        matches!(self.kind, StmtKind::Return(_))
    }

    /// Short description of the node kind, for diagnostics and logs.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StmtKind::Expr(_) => "expression statement",
            StmtKind::Return(_) => "return",
            StmtKind::Var(_) => "variable declaration",
            StmtKind::Fn(_) => "function declaration",
            StmtKind::Block(_) => "block",
        }
    }
}

impl Block {
    pub fn new(id: NodeId, stmts: Vec<Stmt>) -> Self {
        Self { id, stmts }
    }

    /// Shallow scan of the top-level statements for a direct `return`.
    pub fn has_top_level_return(&self) -> bool {
        self.stmts.iter().any(Stmt::is_return)
    }
}
