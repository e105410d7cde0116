// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! InstBuilder - appends instructions at the end of one block.

use crate::{BinaryOp, BlockId, FloatPredicate, FuncId, Function, InstKind, IrType, Value};

pub struct InstBuilder<'f> {
    func: &'f mut Function,
    block: BlockId,
}

impl<'f> InstBuilder<'f> {
    pub fn new(func: &'f mut Function, block: BlockId) -> Self {
        Self { func, block }
    }

    fn push(&mut self, kind: InstKind, ty: IrType, name: Option<&str>) -> Value {
        Value::Inst(self.func.push_inst(self.block, kind, ty, name))
    }

    pub fn alloca(&mut self, ty: IrType, name: &str) -> Value {
        self.push(InstKind::Alloca { ty }, IrType::Ptr, Some(name))
    }

    pub fn load(&mut self, ty: IrType, ptr: Value) -> Value {
        self.push(InstKind::Load { ty, ptr }, ty, None)
    }

    pub fn store(&mut self, value: Value, ptr: Value, volatile: bool) -> Value {
        self.push(InstKind::Store { value, ptr, volatile }, IrType::Void, None)
    }

    /// Result type follows the left operand.
    pub fn binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Value {
        let ty = self.func.value_type(lhs);
        self.push(InstKind::Binary { op, lhs, rhs }, ty, None)
    }

    pub fn fcmp(&mut self, pred: FloatPredicate, lhs: Value, rhs: Value) -> Value {
        self.push(InstKind::FCmp { pred, lhs, rhs }, IrType::I1, None)
    }

    /// `ret` is the callee's declared return type.
    pub fn call(&mut self, callee: FuncId, ret: IrType, args: Vec<Value>) -> Value {
        self.push(InstKind::Call { callee, args }, ret, None)
    }

    /// Empty phi; add inputs with [`Function::add_phi_incoming`].
    pub fn phi(&mut self, ty: IrType, name: &str) -> Value {
        self.push(InstKind::Phi { incoming: Vec::new() }, ty, Some(name))
    }

    pub fn ret(&mut self, value: Option<Value>) -> Value {
        self.push(InstKind::Ret { value }, IrType::Void, None)
    }

    pub fn br(&mut self, target: BlockId) -> Value {
        self.push(InstKind::Br { target }, IrType::Void, None)
    }

    pub fn cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) -> Value {
        self.push(
            InstKind::CondBr {
                cond,
                then_block,
                else_block,
            },
            IrType::Void,
            None,
        )
    }
}
