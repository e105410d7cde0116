// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Programmatic tree construction with fresh node ids.
//!
//! Used by tests and by embedders that build programs without a parser.

use crate::expr::{BinOp, Expr, ExprKind};
use crate::stmt::{Block, FnDecl, Param, Stmt, StmtKind, VarDecl};
use crate::NodeId;

#[derive(Debug, Default)]
pub struct AstBuilder {
    next_id: u32,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn expr(&mut self, kind: ExprKind) -> Expr {
        Expr::new(self.next_id(), kind)
    }

    fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt::new(self.next_id(), kind)
    }

    // ── Expressions ────────────────────────────────────────────

    pub fn int(&mut self, value: i64) -> Expr {
        self.expr(ExprKind::Int(value))
    }

    pub fn double(&mut self, value: f64) -> Expr {
        self.expr(ExprKind::Double(value))
    }

    /// String literal. `raw` is the source text, quotes included.
    pub fn string(&mut self, raw: &str) -> Expr {
        self.expr(ExprKind::Str(raw.to_string()))
    }

    pub fn ident(&mut self, name: &str) -> Expr {
        self.expr(ExprKind::Ident(name.to_string()))
    }

    pub fn call(&mut self, callee: &str, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call {
            callee: callee.to_string(),
            args,
        })
    }

    pub fn binary(&mut self, op: BinOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn assign(&mut self, target: &str, value: Expr) -> Expr {
        self.expr(ExprKind::Assign {
            target: target.to_string(),
            value: Box::new(value),
        })
    }

    pub fn if_else(&mut self, cond: Expr, then_block: Block, else_block: Block) -> Expr {
        self.expr(ExprKind::If {
            cond: Box::new(cond),
            then_block,
            else_block,
        })
    }

    pub fn counting_loop(&mut self, from: Expr, until: Expr, body: Block) -> Expr {
        self.expr(ExprKind::Loop {
            from: Box::new(from),
            until: Box::new(until),
            body,
        })
    }

    // ── Statements ─────────────────────────────────────────────

    pub fn block(&mut self, stmts: Vec<Stmt>) -> Block {
        Block::new(self.next_id(), stmts)
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn ret(&mut self, value: Expr) -> Stmt {
        self.stmt(StmtKind::Return(Some(value)))
    }

    pub fn ret_void(&mut self) -> Stmt {
        self.stmt(StmtKind::Return(None))
    }

    pub fn var(&mut self, ty: &str, name: &str, init: Expr) -> Stmt {
        self.stmt(StmtKind::Var(VarDecl {
            ty: ty.to_string(),
            name: name.to_string(),
            init: Some(init),
        }))
    }

    pub fn var_uninit(&mut self, ty: &str, name: &str) -> Stmt {
        self.stmt(StmtKind::Var(VarDecl {
            ty: ty.to_string(),
            name: name.to_string(),
            init: None,
        }))
    }

    pub fn param(&mut self, ty: &str, name: &str) -> Param {
        Param {
            id: self.next_id(),
            ty: ty.to_string(),
            name: name.to_string(),
        }
    }

    pub fn func(&mut self, ret_ty: Option<&str>, name: &str, params: Vec<Param>, body: Block) -> Stmt {
        self.stmt(StmtKind::Fn(FnDecl {
            ret_ty: ret_ty.map(str::to_string),
            name: name.to_string(),
            params,
            body,
        }))
    }

    pub fn nested(&mut self, block: Block) -> Stmt {
        self.stmt(StmtKind::Block(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut b = AstBuilder::new();
        let one = b.int(1);
        let two = b.int(2);
        let sum = b.binary(BinOp::Add, one, two);
        let stmt = b.expr_stmt(sum.clone());
        assert_eq!(sum.id, NodeId(2));
        assert_eq!(stmt.id, NodeId(3));
    }

    #[test]
    fn top_level_return_scan_is_shallow() {
        let mut b = AstBuilder::new();
        let inner_ret = b.ret_void();
        let inner = b.block(vec![inner_ret]);
        let nested = b.nested(inner);
        let body = b.block(vec![nested]);
        assert!(!body.has_top_level_return());

        let ret = b.ret_void();
        let body = b.block(vec![ret]);
        assert!(body.has_top_level_return());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn reads_json_tree_without_ids() {
        let json = r#"{
            "stmts": [
                { "kind": { "Var": { "ty": "int", "name": "x", "init": { "kind": { "Int": 4 } } } } },
                { "kind": { "Expr": { "kind": { "Call": { "callee": "println", "args": [
                    { "kind": { "Str": "\"hi\"" } }
                ] } } } } }
            ]
        }"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.stmts.len(), 2);
        assert_eq!(block.stmts[0].kind_name(), "variable declaration");
        assert_eq!(block.id, NodeId(0));
    }
}
