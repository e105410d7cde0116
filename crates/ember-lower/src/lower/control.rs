// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Control flow: two-way conditionals and the counting loop.
//!
//! Neither construct opens a merge block. The enclosing scope keeps its
//! cursor, so anything lowered after a conditional or a loop lands in the
//! block that now ends in the branch; the verifier reports that shape.

use ember_ast::{Block, Expr};
use ember_ir::{BinaryOp, BlockId, FloatPredicate, IrType, Value};
use tracing::debug;

use super::Lowerer;
use crate::scope::Cursor;
use crate::LowerResult;

impl<'a> Lowerer<'a> {
    pub(super) fn lower_if(
        &mut self,
        cond: &Expr,
        then_block: &Block,
        else_block: &Block,
    ) -> LowerResult<Option<Value>> {
        let cond = self.lower_operand(cond, "condition")?;
        let cursor = self.cursor()?;
        let function = self.module.function_mut(cursor.func);
        let then_bb = function.create_block("then");
        let else_bb = function.create_block("else");
        self.builder_at(cursor).cond_br(cond, then_bb, else_bb);
        debug!(?then_bb, ?else_bb, "conditional");

        self.lower_region(Cursor { block: then_bb, ..cursor }, then_block)?;
        self.lower_region(Cursor { block: else_bb, ..cursor }, else_block)?;
        Ok(None)
    }

    /// Lower `block` under a copy of the current scope, emitting at `cursor`.
    fn lower_region(&mut self, cursor: Cursor, block: &Block) -> LowerResult<Option<Value>> {
        self.scopes.push_copy(cursor)?;
        let value = self.lower_block(block);
        self.scopes.pop()?;
        value
    }

    pub(super) fn lower_loop(&mut self, from: &Expr, until: &Expr, body: &Block) -> LowerResult<Option<Value>> {
        let start = self.lower_operand(from, "loop start")?;
        let pre = self.cursor()?;
        let loop_bb = self.module.function_mut(pre.func).create_block("loop");
        self.builder_at(pre).br(loop_bb);
        debug!(?loop_bb, "loop");

        let loop_cursor = Cursor { block: loop_bb, ..pre };
        self.scopes.push_copy(loop_cursor)?;
        let after = self.lower_loop_region(pre, start, loop_cursor, until, body);
        self.scopes.pop()?;
        let after = after?;

        self.builder_at(Cursor { block: after, ..pre }).ret(None);
        Ok(None)
    }

    /// Phi, body, step and exit test. Returns the exit block.
    fn lower_loop_region(
        &mut self,
        pre: Cursor,
        start: Value,
        loop_cursor: Cursor,
        until: &Expr,
        body: &Block,
    ) -> LowerResult<BlockId> {
        let induction = self.options.induction_name.clone();
        let phi = self.builder_at(loop_cursor).phi(IrType::F64, &induction);
        self.module
            .function_mut(pre.func)
            .add_phi_incoming(phi, start, pre.block)?;
        self.scopes.declare(&induction, phi, None)?;

        self.lower_block(body)?;

        let next = self.builder()?.binary(BinaryOp::FAdd, phi, Value::float(1.0));
        let bound = self.lower_operand(until, "loop bound")?;
        let closing = self.cursor()?;
        let test = self.builder_at(closing).fcmp(FloatPredicate::Ole, next, bound);
        let function = self.module.function_mut(pre.func);
        function.set_value_name(next, "nextvar");
        function.set_value_name(test, "loopcond");
        let after = function.create_block("afterloop");
        self.builder_at(closing).cond_br(test, loop_cursor.block, after);
        self.module
            .function_mut(pre.func)
            .add_phi_incoming(phi, next, closing.block)?;
        Ok(after)
    }
}
