// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Structural and type checks over a finished module.
//!
//! Lowering may leave a module partially invalid (best-effort diagnostics,
//! unterminated branches). The verifier finds those spots before a module is
//! handed to code generation.

use thiserror::Error;

use crate::{BlockId, FuncId, Function, InstKind, IrType, Module, Value};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("in @{function}, block `{block}`: {kind}")]
pub struct VerifyError {
    pub function: String,
    pub block: String,
    pub kind: VerifyErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyErrorKind {
    #[error("block has no terminator")]
    MissingTerminator,
    #[error("instruction after terminator")]
    InstructionAfterTerminator,
    #[error("phi is not at the start of its block")]
    MisplacedPhi,
    #[error("`{op}` expects {expected} operands, found {found}")]
    OperandType {
        op: &'static str,
        expected: &'static str,
        found: IrType,
    },
    #[error("`{op}` operand must be ptr, found {found}")]
    NotAPointer { op: &'static str, found: IrType },
    #[error("stored value is {found} but the slot holds {expected}")]
    StoreType { expected: IrType, found: IrType },
    #[error("cannot allocate a slot of type void")]
    VoidSlot,
    #[error("call to @{callee} passes {found} arguments, expected {expected}")]
    CallArity {
        callee: String,
        expected: usize,
        found: usize,
    },
    #[error("argument {index} of call to @{callee} is {found}, expected {expected}")]
    CallArgType {
        callee: String,
        index: usize,
        expected: IrType,
        found: IrType,
    },
    #[error("return of {found} from a function returning {expected}")]
    ReturnType { expected: IrType, found: IrType },
    #[error("branch condition must be i1, found {0}")]
    ConditionType(IrType),
    #[error("phi of type {expected} has an incoming {found} value")]
    PhiType { expected: IrType, found: IrType },
}

/// Check every defined function in `module`. Returns all problems found.
pub fn verify(module: &Module) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    for (_, func) in module.functions() {
        if func.is_declaration() {
            continue;
        }
        FunctionVerifier { module, func, errors: &mut errors }.run();
    }
    errors
}

struct FunctionVerifier<'a> {
    module: &'a Module,
    func: &'a Function,
    errors: &'a mut Vec<VerifyError>,
}

impl FunctionVerifier<'_> {
    fn report(&mut self, block: BlockId, kind: VerifyErrorKind) {
        self.errors.push(VerifyError {
            function: self.func.name.clone(),
            block: self.func.block(block).name.clone(),
            kind,
        });
    }

    fn ty(&self, v: Value) -> IrType {
        self.func.value_type(v)
    }

    fn run(&mut self) {
        let blocks: Vec<BlockId> = self.func.blocks().map(|(id, _)| id).collect();
        for block in blocks {
            self.check_block_shape(block);
            let insts: Vec<_> = self
                .func
                .block_insts(block)
                .map(|(_, data)| (data.kind.clone(), data.ty))
                .collect();
            for (kind, ty) in insts {
                self.check_inst(block, &kind, ty);
            }
        }
    }

    fn check_block_shape(&mut self, block: BlockId) {
        let kinds: Vec<InstKind> = self.func.block_insts(block).map(|(_, d)| d.kind.clone()).collect();
        match kinds.iter().position(InstKind::is_terminator) {
            None => self.report(block, VerifyErrorKind::MissingTerminator),
            Some(pos) if pos + 1 != kinds.len() => {
                self.report(block, VerifyErrorKind::InstructionAfterTerminator)
            }
            Some(_) => {}
        }
        let mut seen_non_phi = false;
        for kind in &kinds {
            if matches!(kind, InstKind::Phi { .. }) {
                if seen_non_phi {
                    self.report(block, VerifyErrorKind::MisplacedPhi);
                    break;
                }
            } else {
                seen_non_phi = true;
            }
        }
    }

    fn check_inst(&mut self, block: BlockId, kind: &InstKind, ty: IrType) {
        match kind {
            InstKind::Alloca { ty } => {
                if ty.is_void() {
                    self.report(block, VerifyErrorKind::VoidSlot);
                }
            }
            InstKind::Load { ptr, .. } => {
                let found = self.ty(*ptr);
                if found != IrType::Ptr {
                    self.report(block, VerifyErrorKind::NotAPointer { op: "load", found });
                }
            }
            InstKind::Store { value, ptr, .. } => {
                let found = self.ty(*ptr);
                if found != IrType::Ptr {
                    self.report(block, VerifyErrorKind::NotAPointer { op: "store", found });
                } else if let Some(expected) = self.func.slot_type(*ptr) {
                    let found = self.ty(*value);
                    if found != expected {
                        self.report(block, VerifyErrorKind::StoreType { expected, found });
                    }
                }
            }
            InstKind::Binary { op, lhs, rhs } => {
                let (l, r) = (self.ty(*lhs), self.ty(*rhs));
                let ok = if op.is_float() {
                    l.is_float() && r.is_float()
                } else {
                    l.is_int() && l == r
                };
                if !ok {
                    let found = if op.is_float() && l.is_float() { r } else { l };
                    self.report(
                        block,
                        VerifyErrorKind::OperandType {
                            op: op.mnemonic(),
                            expected: if op.is_float() { "f64" } else { "integer" },
                            found,
                        },
                    );
                }
            }
            InstKind::FCmp { lhs, rhs, .. } => {
                for v in [*lhs, *rhs] {
                    let found = self.ty(v);
                    if !found.is_float() {
                        self.report(
                            block,
                            VerifyErrorKind::OperandType { op: "fcmp", expected: "f64", found },
                        );
                        break;
                    }
                }
            }
            InstKind::Call { callee, args } => self.check_call(block, *callee, args),
            InstKind::Phi { incoming } => {
                for (v, _) in incoming {
                    let found = self.ty(*v);
                    if found != ty {
                        self.report(block, VerifyErrorKind::PhiType { expected: ty, found });
                    }
                }
            }
            InstKind::Ret { value } => {
                let expected = self.func.sig.ret;
                let found = value.map(|v| self.ty(v)).unwrap_or(IrType::Void);
                if found != expected {
                    self.report(block, VerifyErrorKind::ReturnType { expected, found });
                }
            }
            InstKind::Br { .. } => {}
            InstKind::CondBr { cond, .. } => {
                let found = self.ty(*cond);
                if found != IrType::I1 {
                    self.report(block, VerifyErrorKind::ConditionType(found));
                }
            }
        }
    }

    fn check_call(&mut self, block: BlockId, callee: FuncId, args: &[Value]) {
        let target = self.module.function(callee);
        let expected = target.sig.params.len();
        let arity_ok = if target.sig.variadic {
            args.len() >= expected
        } else {
            args.len() == expected
        };
        if !arity_ok {
            self.report(
                block,
                VerifyErrorKind::CallArity {
                    callee: target.name.clone(),
                    expected,
                    found: args.len(),
                },
            );
            return;
        }
        for (index, (arg, param)) in args.iter().zip(&target.sig.params).enumerate() {
            let found = self.ty(*arg);
            if found != *param {
                self.report(
                    block,
                    VerifyErrorKind::CallArgType {
                        callee: target.name.clone(),
                        index,
                        expected: *param,
                        found,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryOp, FloatPredicate, InstBuilder, Linkage, Signature};

    fn module_with_main() -> (Module, crate::FuncId) {
        let mut m = Module::new("t");
        let main = m.add_function("main", Signature::new(vec![], IrType::Void), Linkage::External);
        (m, main)
    }

    #[test]
    fn well_formed_loop_passes() {
        let (mut m, main) = module_with_main();
        let f = m.function_mut(main);
        let entry = f.create_block("entry");
        let body = f.create_block("loop");
        let after = f.create_block("afterloop");
        InstBuilder::new(f, entry).br(body);
        let mut b = InstBuilder::new(f, body);
        let i = b.phi(IrType::F64, "i");
        let next = b.binary(BinaryOp::FAdd, i, Value::float(1.0));
        let cond = b.fcmp(FloatPredicate::Ole, next, Value::float(5.0));
        b.cond_br(cond, body, after);
        f.add_phi_incoming(i, Value::float(1.0), entry).unwrap();
        f.add_phi_incoming(i, next, body).unwrap();
        InstBuilder::new(f, after).ret(None);

        assert_eq!(verify(&m), vec![]);
    }

    #[test]
    fn reports_missing_and_doubled_terminators() {
        let (mut m, main) = module_with_main();
        let f = m.function_mut(main);
        let entry = f.create_block("entry");
        let dangling = f.create_block("then");
        let mut b = InstBuilder::new(f, entry);
        b.br(dangling);
        b.ret(None);

        let kinds: Vec<_> = verify(&m).into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![VerifyErrorKind::InstructionAfterTerminator, VerifyErrorKind::MissingTerminator]
        );
    }

    #[test]
    fn integer_operands_to_fadd_are_rejected() {
        let (mut m, main) = module_with_main();
        let f = m.function_mut(main);
        let entry = f.create_block("entry");
        let mut b = InstBuilder::new(f, entry);
        b.binary(BinaryOp::FAdd, Value::int(1), Value::int(2));
        b.ret(None);

        let errors = verify(&m);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0].kind,
            VerifyErrorKind::OperandType { op: "fadd", found: IrType::I64, .. }
        ));
        assert_eq!(
            errors[0].to_string(),
            "in @main, block `entry`: `fadd` expects f64 operands, found i64"
        );
    }

    #[test]
    fn store_type_must_match_slot() {
        let (mut m, main) = module_with_main();
        let f = m.function_mut(main);
        let entry = f.create_block("entry");
        let mut b = InstBuilder::new(f, entry);
        let slot = b.alloca(IrType::I64, "x");
        b.store(Value::float(1.5), slot, true);
        b.ret(None);

        let errors = verify(&m);
        assert_eq!(
            errors.iter().map(|e| e.kind.clone()).collect::<Vec<_>>(),
            vec![VerifyErrorKind::StoreType { expected: IrType::I64, found: IrType::F64 }]
        );
    }

    #[test]
    fn call_arity_respects_variadics() {
        let mut m = Module::new("t");
        let printf = m.add_function("printf", Signature::variadic(vec![IrType::Str], IrType::I32), Linkage::External);
        let main = m.add_function("main", Signature::new(vec![], IrType::Void), Linkage::External);
        let text = m.add_global_string("str", "x");
        let f = m.function_mut(main);
        let entry = f.create_block("entry");
        let mut b = InstBuilder::new(f, entry);
        b.call(printf, IrType::I32, vec![text, Value::int(1)]);
        b.call(printf, IrType::I32, vec![]);
        b.ret(None);

        let errors = verify(&m);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, VerifyErrorKind::CallArity { expected: 1, found: 0, .. }));
    }
}
