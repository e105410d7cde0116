// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Expression lowering: strings, identifiers, calls, operators, assignment.

use ember_ast::{BinOp, Expr};
use ember_ir::{BinaryOp, FloatPredicate, Value};
use tracing::debug;

use super::Lowerer;
use crate::scope::DeclKind;
use crate::{LowerError, LowerResult};

/// Source text of a string literal with its delimiters removed.
///
/// Quotes, spaces and tabs are trimmed from both ends, then every literal
/// backslash-n pair becomes a newline. No other escapes are recognised.
pub fn literal_text(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == ' ' || c == '\t')
        .replace("\\n", "\n")
}

/// How an operator tag maps onto IR.
#[derive(Clone, Copy)]
enum OpLowering {
    Arith(BinaryOp),
    Compare(FloatPredicate),
}

impl OpLowering {
    fn of(op: BinOp) -> Option<Self> {
        match op {
            BinOp::Add => Some(Self::Arith(BinaryOp::FAdd)),
            BinOp::Sub => Some(Self::Arith(BinaryOp::FSub)),
            BinOp::Mul => Some(Self::Arith(BinaryOp::FMul)),
            BinOp::Div => Some(Self::Arith(BinaryOp::SDiv)),
            BinOp::Lt => Some(Self::Compare(FloatPredicate::Olt)),
            BinOp::Gt => Some(Self::Compare(FloatPredicate::Ogt)),
            BinOp::Le | BinOp::Ge | BinOp::Eq | BinOp::Ne => None,
        }
    }
}

impl<'a> Lowerer<'a> {
    pub(super) fn lower_string(&mut self, raw: &str) -> Value {
        self.module.add_global_string("str", &literal_text(raw))
    }

    /// The storage location (or incoming value) bound to `name`. Not loaded.
    pub(super) fn lower_ident(&mut self, name: &str) -> LowerResult<Value> {
        self.scopes
            .resolve(name)
            .ok_or_else(|| LowerError::UnresolvedIdentifier {
                name: name.to_string(),
            })
    }

    /// Lower an expression whose value is consumed, loading it if it is a
    /// slot. `context` names the consumer for the error when there is no value.
    pub(super) fn lower_operand(&mut self, expr: &Expr, context: &'static str) -> LowerResult<Value> {
        let value = self
            .lower_expr(expr)?
            .ok_or(LowerError::MissingValue { context })?;
        self.materialize(value)
    }

    pub(super) fn lower_call(&mut self, callee: &str, args: &[Expr]) -> LowerResult<Option<Value>> {
        let func = self
            .module
            .get_function(callee)
            .ok_or_else(|| LowerError::UnknownCallee {
                name: callee.to_string(),
            })?;
        let sig = self.module.function(func).sig.clone();
        let arity_ok = if sig.variadic {
            args.len() >= sig.params.len()
        } else {
            args.len() == sig.params.len()
        };
        if !arity_ok {
            return Err(LowerError::ArityMismatch {
                name: callee.to_string(),
                expected: sig.params.len(),
                found: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self
                .lower_expr(arg)?
                .ok_or(LowerError::MissingValue { context: "call argument" })?;
            // Only references to declared variables or parameters are loaded.
            let declared = arg
                .binding_key()
                .is_some_and(|key| self.scopes.decl_of(key).is_some());
            let value = if declared {
                self.materialize(value)?
            } else {
                value
            };
            values.push(value);
        }

        debug!(callee, args = values.len(), "call");
        Ok(Some(self.builder()?.call(func, sig.ret, values)))
    }

    pub(super) fn lower_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> LowerResult<Value> {
        let lhs = self.lower_operand(left, "left operand")?;
        let rhs = self.lower_operand(right, "right operand")?;
        let lowering = OpLowering::of(op).ok_or(LowerError::UnsupportedOperator { op })?;
        let mut b = self.builder()?;
        Ok(match lowering {
            OpLowering::Arith(op) => b.binary(op, lhs, rhs),
            OpLowering::Compare(pred) => b.fcmp(pred, lhs, rhs),
        })
    }

    /// Volatile store of the value into the slot bound to `target`.
    pub(super) fn lower_assign(&mut self, target: &str, value: &Expr) -> LowerResult<Value> {
        let slot = self
            .scopes
            .resolve(target)
            .ok_or_else(|| LowerError::UndeclaredAssignment {
                name: target.to_string(),
            })?;
        let cursor = self.cursor()?;
        if self.module.function(cursor.func).slot_type(slot).is_none() {
            // Only parameters carry declaration metadata without a slot.
            let what = match self.scopes.decl_of(target).and_then(|id| self.decl(id)) {
                Some(info) if info.kind == DeclKind::Parameter => "parameter",
                Some(_) => "value",
                None => "loop counter",
            };
            return Err(LowerError::NotAssignable {
                name: target.to_string(),
                what,
            });
        }
        let value = self.lower_operand(value, "assigned value")?;
        Ok(self.builder()?.store(value, slot, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_text_trims_and_unescapes() {
        assert_eq!(literal_text("\"a\\nb\""), "a\nb");
        assert_eq!(literal_text(" \t\"hello\" "), "hello");
        assert_eq!(literal_text("\"tab\\tstays\""), "tab\\tstays");
        assert_eq!(literal_text("\"\""), "");
    }

    #[test]
    fn only_six_operators_lower() {
        let supported = [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div, BinOp::Lt, BinOp::Gt];
        for op in supported {
            assert!(OpLowering::of(op).is_some(), "{op}");
        }
        for op in [BinOp::Le, BinOp::Ge, BinOp::Eq, BinOp::Ne] {
            assert!(OpLowering::of(op).is_none(), "{op}");
        }
    }
}
