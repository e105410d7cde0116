// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! AST lowering - walk the tree depth-first and emit IR at the cursor.
//!
//! Every rule returns `LowerResult<Option<Value>>`. `None` means the node
//! produced no value (a statement, a loop, a failed sibling under
//! best-effort). Blocks are the recovery point: see [`Lowerer::lower_block`].

mod control;
mod expr;
mod stmt;

pub use expr::literal_text;

use ember_ast::{Block, Expr, ExprKind};
use ember_ir::{InstBuilder, IrType, Module, Value};
use tracing::{trace, warn};

use crate::scope::{Cursor, DeclId, DeclInfo, ScopeStack};
use crate::{ErrorPolicy, LowerError, LowerOptions, LowerResult};

/// Map a source type name onto an IR type. Unknown names are `void`.
pub fn type_of(name: &str) -> IrType {
    match name {
        "int" => IrType::I64,
        "double" => IrType::F64,
        "str" => IrType::Str,
        _ => IrType::Void,
    }
}

/// Lowering state for one module: the scope stack, the declaration arena and
/// the diagnostics recorded so far.
pub struct Lowerer<'a> {
    module: &'a mut Module,
    options: &'a LowerOptions,
    pub(crate) scopes: ScopeStack,
    decls: Vec<DeclInfo>,
    errors: Vec<LowerError>,
}

impl<'a> Lowerer<'a> {
    pub fn new(module: &'a mut Module, options: &'a LowerOptions) -> Self {
        Self {
            module,
            options,
            scopes: ScopeStack::new(),
            decls: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn module(&self) -> &Module {
        self.module
    }

    pub fn options(&self) -> &LowerOptions {
        self.options
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeStack {
        &mut self.scopes
    }

    pub fn decl(&self, id: DeclId) -> Option<&DeclInfo> {
        self.decls.get(id.0 as usize)
    }

    /// Diagnostics recorded under [`ErrorPolicy::BestEffort`].
    pub fn errors(&self) -> &[LowerError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LowerError> {
        self.errors
    }

    pub fn cursor(&self) -> LowerResult<Cursor> {
        self.scopes.cursor()
    }

    /// Builder appending to the innermost scope's block.
    pub(crate) fn builder(&mut self) -> LowerResult<InstBuilder<'_>> {
        let cursor = self.scopes.cursor()?;
        Ok(self.builder_at(cursor))
    }

    pub(crate) fn builder_at(&mut self, cursor: Cursor) -> InstBuilder<'_> {
        InstBuilder::new(self.module.function_mut(cursor.func), cursor.block)
    }

    /// Turn a storage location into the value it holds. Anything that is not
    /// a stack slot is already a value and passes through unchanged.
    pub(crate) fn materialize(&mut self, value: Value) -> LowerResult<Value> {
        let cursor = self.scopes.cursor()?;
        match self.module.function(cursor.func).slot_type(value) {
            Some(ty) => Ok(self.builder_at(cursor).load(ty, value)),
            None => Ok(value),
        }
    }

    pub(crate) fn add_decl(&mut self, info: DeclInfo) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(info);
        id
    }

    /// Record a statement-level failure, or hand it back when lowering has
    /// to stop.
    fn recover(&mut self, err: LowerError) -> LowerResult<()> {
        if err.is_internal() || self.options.policy == ErrorPolicy::FailFast {
            return Err(err);
        }
        warn!(error = %err, "skipping statement");
        self.errors.push(err);
        Ok(())
    }

    /// Lower statements in order. The value of the block is the value of its
    /// last statement.
    pub fn lower_block(&mut self, block: &Block) -> LowerResult<Option<Value>> {
        let mut last = None;
        for stmt in &block.stmts {
            last = match self.lower_stmt(stmt) {
                Ok(value) => value,
                Err(err) => {
                    self.recover(err)?;
                    None
                }
            };
        }
        Ok(last)
    }

    pub fn lower_expr(&mut self, expr: &Expr) -> LowerResult<Option<Value>> {
        trace!(node = expr.id.0, kind = expr.kind_name(), "lowering");
        match &expr.kind {
            ExprKind::Int(n) => Ok(Some(Value::int(*n))),
            ExprKind::Double(x) => Ok(Some(Value::float(*x))),
            ExprKind::Str(raw) => Ok(Some(self.lower_string(raw))),
            ExprKind::Ident(name) => self.lower_ident(name).map(Some),
            ExprKind::Call { callee, args } => self.lower_call(callee, args),
            ExprKind::Binary { op, left, right } => {
                self.lower_binary(*op, left, right).map(Some)
            }
            ExprKind::Assign { target, value } => self.lower_assign(target, value).map(Some),
            ExprKind::If {
                cond,
                then_block,
                else_block,
            } => self.lower_if(cond, then_block, else_block),
            ExprKind::Loop { from, until, body } => self.lower_loop(from, until, body),
            ExprKind::Block(block) => self.lower_block(block),
        }
    }
}
