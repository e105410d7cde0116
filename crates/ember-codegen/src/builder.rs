// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Function builder - translates one IR function into Cranelift IR.
//!
//! Stack slots come from `alloca`, phis become block parameters and every
//! branch passes the phi inputs for its edge as block arguments.

use cranelift::prelude::*;
use cranelift_codegen::ir::{FuncRef, Function, GlobalValue, MemFlags, StackSlotData, StackSlotKind};
use cranelift_codegen::isa::CallConv;
use cranelift_frontend::{FunctionBuilder as ClifFunctionBuilder, FunctionBuilderContext};
use std::collections::HashMap;

use ember_ir as ir;
use ember_ir::{BinaryOp, BlockId, FloatPredicate, InstId, InstKind};

use crate::types::{align_shift, ir_to_cranelift_type};
use crate::{CodegenError, CodegenResult};

pub struct FunctionBuilder<'a> {
    func: &'a mut Function,
    builder_ctx: FunctionBuilderContext,
    module: &'a ir::Module,
    ir_fn: &'a ir::Function,
    ptr_ty: Type,
    call_conv: CallConv,
    /// Pre-imported function references (IR function → Cranelift FuncRef)
    func_refs: &'a HashMap<ir::FuncId, FuncRef>,
    /// String constants (IR global → GlobalValue for the data address)
    string_globals: &'a HashMap<ir::GlobalId, GlobalValue>,

    block_map: HashMap<BlockId, Block>,
    values: HashMap<InstId, Value>,
}

impl<'a> FunctionBuilder<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        func: &'a mut Function,
        module: &'a ir::Module,
        ir_fn: &'a ir::Function,
        ptr_ty: Type,
        call_conv: CallConv,
        func_refs: &'a HashMap<ir::FuncId, FuncRef>,
        string_globals: &'a HashMap<ir::GlobalId, GlobalValue>,
    ) -> Self {
        FunctionBuilder {
            func,
            builder_ctx: FunctionBuilderContext::new(),
            module,
            ir_fn,
            ptr_ty,
            call_conv,
            func_refs,
            string_globals,
            block_map: HashMap::new(),
            values: HashMap::new(),
        }
    }

    /// Build the Cranelift body. The IR function must have passed verification.
    pub fn build(&mut self) -> CodegenResult<()> {
        let entry_id = self
            .ir_fn
            .entry_block()
            .ok_or_else(|| CodegenError::Unsupported(format!("@{} has no body", self.ir_fn.name)))?;

        let mut builder = ClifFunctionBuilder::new(self.func, &mut self.builder_ctx);

        // Create blocks, with one block parameter per leading phi
        for (id, _) in self.ir_fn.blocks() {
            let block = builder.create_block();
            self.block_map.insert(id, block);
            for (inst_id, data) in self.ir_fn.block_insts(id) {
                if !matches!(data.kind, InstKind::Phi { .. }) {
                    break;
                }
                let ty = ir_to_cranelift_type(data.ty, self.ptr_ty)
                    .ok_or_else(|| CodegenError::Unsupported("void phi".to_string()))?;
                let param = builder.append_block_param(block, ty);
                self.values.insert(inst_id, param);
            }
        }

        let entry = self.block_map[&entry_id];
        builder.append_block_params_for_function_params(entry);

        for (id, _) in self.ir_fn.blocks() {
            builder.switch_to_block(self.block_map[&id]);
            for (inst_id, data) in self.ir_fn.block_insts(id) {
                let ctx = Ctx {
                    module: self.module,
                    ir_fn: self.ir_fn,
                    ptr_ty: self.ptr_ty,
                    call_conv: self.call_conv,
                    func_refs: self.func_refs,
                    string_globals: self.string_globals,
                    block_map: &self.block_map,
                    entry,
                    current: id,
                };
                if let Some(value) = ctx.lower_inst(&mut builder, &self.values, &data.kind, data.ty)? {
                    self.values.insert(inst_id, value);
                }
            }
        }

        // All predecessors are known once every block has been emitted
        builder.seal_all_blocks();
        builder.finalize();
        Ok(())
    }
}

/// Read-only state shared by the per-instruction lowering.
struct Ctx<'a> {
    module: &'a ir::Module,
    ir_fn: &'a ir::Function,
    ptr_ty: Type,
    call_conv: CallConv,
    func_refs: &'a HashMap<ir::FuncId, FuncRef>,
    string_globals: &'a HashMap<ir::GlobalId, GlobalValue>,
    block_map: &'a HashMap<BlockId, Block>,
    entry: Block,
    current: BlockId,
}

impl Ctx<'_> {
    fn lower_inst(
        &self,
        builder: &mut ClifFunctionBuilder,
        values: &HashMap<InstId, Value>,
        kind: &InstKind,
        ty: ir::IrType,
    ) -> CodegenResult<Option<Value>> {
        let operand = |builder: &mut ClifFunctionBuilder, v: ir::Value| self.operand(builder, values, v);

        let value = match kind {
            InstKind::Alloca { ty } => {
                let slot = builder.create_sized_stack_slot(StackSlotData::new(
                    StackSlotKind::ExplicitSlot,
                    ty.size(),
                    align_shift(*ty),
                ));
                Some(builder.ins().stack_addr(self.ptr_ty, slot, 0))
            }
            InstKind::Load { ty, ptr } => {
                let cl_ty = self.value_type(*ty)?;
                let ptr = operand(builder, *ptr)?;
                Some(builder.ins().load(cl_ty, MemFlags::new(), ptr, 0))
            }
            InstKind::Store { value, ptr, .. } => {
                // Cranelift has no volatile flag; plain stores are never elided
                // across the calls that observe them.
                let value = operand(builder, *value)?;
                let ptr = operand(builder, *ptr)?;
                builder.ins().store(MemFlags::new(), value, ptr, 0);
                None
            }
            InstKind::Binary { op, lhs, rhs } => {
                let lhs = operand(builder, *lhs)?;
                let rhs = operand(builder, *rhs)?;
                Some(match op {
                    BinaryOp::FAdd => builder.ins().fadd(lhs, rhs),
                    BinaryOp::FSub => builder.ins().fsub(lhs, rhs),
                    BinaryOp::FMul => builder.ins().fmul(lhs, rhs),
                    BinaryOp::SDiv => builder.ins().sdiv(lhs, rhs),
                })
            }
            InstKind::FCmp { pred, lhs, rhs } => {
                let lhs = operand(builder, *lhs)?;
                let rhs = operand(builder, *rhs)?;
                let cc = match pred {
                    FloatPredicate::Olt => FloatCC::LessThan,
                    FloatPredicate::Ogt => FloatCC::GreaterThan,
                    FloatPredicate::Ole => FloatCC::LessThanOrEqual,
                };
                Some(builder.ins().fcmp(cc, lhs, rhs))
            }
            InstKind::Call { callee, args } => {
                let mut arg_vals = Vec::with_capacity(args.len());
                for arg in args {
                    arg_vals.push(operand(builder, *arg)?);
                }
                self.lower_call(builder, *callee, ty, &arg_vals)?
            }
            // Already a block parameter
            InstKind::Phi { .. } => None,
            InstKind::Ret { value } => {
                match value {
                    Some(v) => {
                        let v = operand(builder, *v)?;
                        builder.ins().return_(&[v]);
                    }
                    None => {
                        builder.ins().return_(&[]);
                    }
                }
                None
            }
            InstKind::Br { target } => {
                let args = self.edge_args(builder, values, *target)?;
                builder.ins().jump(self.block(*target)?, &args);
                None
            }
            InstKind::CondBr {
                cond,
                then_block,
                else_block,
            } => {
                let cond = operand(builder, *cond)?;
                let then_args = self.edge_args(builder, values, *then_block)?;
                let else_args = self.edge_args(builder, values, *else_block)?;
                builder.ins().brif(
                    cond,
                    self.block(*then_block)?,
                    &then_args,
                    self.block(*else_block)?,
                    &else_args,
                );
                None
            }
        };
        Ok(value)
    }

    fn lower_call(
        &self,
        builder: &mut ClifFunctionBuilder,
        callee: ir::FuncId,
        ret: ir::IrType,
        args: &[Value],
    ) -> CodegenResult<Option<Value>> {
        let target = self.module.function(callee);
        let func_ref = *self
            .func_refs
            .get(&callee)
            .ok_or_else(|| CodegenError::FunctionNotFound(target.name.clone()))?;

        let call = if target.sig.variadic {
            // Variadic callees are called through a signature built from the
            // actual arguments of this call site.
            let mut sig = Signature::new(self.call_conv);
            for arg in args {
                sig.params.push(AbiParam::new(builder.func.dfg.value_type(*arg)));
            }
            if let Some(ty) = ir_to_cranelift_type(ret, self.ptr_ty) {
                sig.returns.push(AbiParam::new(ty));
            }
            let sig_ref = builder.import_signature(sig);
            let addr = builder.ins().func_addr(self.ptr_ty, func_ref);
            builder.ins().call_indirect(sig_ref, addr, args)
        } else {
            builder.ins().call(func_ref, args)
        };
        Ok(builder.inst_results(call).first().copied())
    }

    /// Phi inputs of `target` for the edge leaving the current block.
    fn edge_args(
        &self,
        builder: &mut ClifFunctionBuilder,
        values: &HashMap<InstId, Value>,
        target: BlockId,
    ) -> CodegenResult<Vec<Value>> {
        let mut args = Vec::new();
        for (_, data) in self.ir_fn.block_insts(target) {
            let InstKind::Phi { incoming } = &data.kind else {
                break;
            };
            let (value, _) = incoming
                .iter()
                .find(|(_, from)| *from == self.current)
                .ok_or_else(|| {
                    CodegenError::Unsupported(format!(
                        "phi in `{}` has no input from `{}`",
                        self.ir_fn.block(target).name,
                        self.ir_fn.block(self.current).name
                    ))
                })?;
            args.push(self.operand(builder, values, *value)?);
        }
        Ok(args)
    }

    fn operand(
        &self,
        builder: &mut ClifFunctionBuilder,
        values: &HashMap<InstId, Value>,
        value: ir::Value,
    ) -> CodegenResult<Value> {
        match value {
            ir::Value::Const(ir::Constant::Int(n)) => Ok(builder.ins().iconst(types::I64, n)),
            ir::Value::Const(ir::Constant::Float(x)) => Ok(builder.ins().f64const(x)),
            ir::Value::Param(i) => builder
                .block_params(self.entry)
                .get(i as usize)
                .copied()
                .ok_or_else(|| CodegenError::Unsupported(format!("parameter {} out of range", i))),
            ir::Value::Global(id) => {
                let gv = self
                    .string_globals
                    .get(&id)
                    .ok_or_else(|| CodegenError::Unsupported(format!("unknown string @{}", self.module.global(id).name)))?;
                Ok(builder.ins().global_value(self.ptr_ty, *gv))
            }
            ir::Value::Inst(id) => values
                .get(&id)
                .copied()
                .ok_or_else(|| CodegenError::Unsupported(format!("value %{} used before definition", id.0))),
        }
    }

    fn value_type(&self, ty: ir::IrType) -> CodegenResult<Type> {
        ir_to_cranelift_type(ty, self.ptr_ty)
            .ok_or_else(|| CodegenError::Unsupported("void value".to_string()))
    }

    fn block(&self, id: BlockId) -> CodegenResult<Block> {
        self.block_map
            .get(&id)
            .copied()
            .ok_or_else(|| CodegenError::Unsupported(format!("unknown block {}", id.0)))
    }
}
