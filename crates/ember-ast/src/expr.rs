// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use std::fmt;

use crate::stmt::Block;
use crate::NodeId;

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: NodeId,
    pub kind: ExprKind,
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// Integer literal
    Int(i64),
    /// Floating-point literal
    Double(f64),
    /// String literal, raw source text including its quotes
    Str(String),
    /// Identifier
    Ident(String),
    /// Call of a named function
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Assignment to an already declared variable
    Assign {
        target: String,
        value: Box<Expr>,
    },
    /// `if` with mandatory `else`
    If {
        cond: Box<Expr>,
        then_block: Block,
        else_block: Block,
    },
    /// Counting loop from `from` up to and including `until`, step 1
    Loop {
        from: Box<Expr>,
        until: Box<Expr>,
        body: Block,
    },
    /// Nested block
    Block(Block),
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind) -> Self {
        Self { id, kind }
    }

    /// Name used for the variable-metadata lookup when this expression is a
    /// call argument. Only identifiers have one.
    pub fn binding_key(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Short description of the node kind, for diagnostics and logs.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Int(_) => "integer literal",
            ExprKind::Double(_) => "double literal",
            ExprKind::Str(_) => "string literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Call { .. } => "method call",
            ExprKind::Binary { .. } => "binary operator",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::If { .. } => "conditional",
            ExprKind::Loop { .. } => "loop",
            ExprKind::Block(_) => "block",
        }
    }
}

/// Binary operators a parser can produce.
///
/// Not every operator is lowerable; see `ember-lower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // Comparison
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_identifiers_have_binding_keys() {
        let ident = Expr::new(NodeId(0), ExprKind::Ident("count".to_string()));
        let lit = Expr::new(NodeId(1), ExprKind::Int(3));
        assert_eq!(ident.binding_key(), Some("count"));
        assert_eq!(lit.binding_key(), None);
    }

    #[test]
    fn operator_symbols() {
        assert_eq!(BinOp::Div.to_string(), "/");
        assert_eq!(BinOp::Le.symbol(), "<=");
    }
}
