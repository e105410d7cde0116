// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Cranelift module setup and code generation orchestration.

use cranelift::prelude::*;
use cranelift_codegen::ir::GlobalValue;
use cranelift_codegen::isa::OwnedTargetIsa;
use cranelift_codegen::settings::Configurable;
use cranelift_module::{DataDescription, DataId, Linkage, Module};
use cranelift_object::{ObjectBuilder, ObjectModule};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use ember_ir as ir;

use crate::builder::FunctionBuilder;
use crate::types::ir_to_cranelift_type;
use crate::{CodegenError, CodegenResult};

fn cranelift_err(e: impl std::fmt::Display) -> CodegenError {
    CodegenError::Cranelift(e.to_string())
}

/// ISA for `triple`, or for the host when none is given.
fn target_isa(triple: Option<&str>) -> CodegenResult<OwnedTargetIsa> {
    let isa_builder = match triple {
        Some(triple) => {
            let parsed = target_lexicon::Triple::from_str(triple)
                .map_err(|_| CodegenError::UnknownTarget(triple.to_string()))?;
            cranelift_codegen::isa::lookup(parsed)
                .map_err(|_| CodegenError::UnknownTarget(triple.to_string()))?
        }
        None => cranelift_native::builder().map_err(cranelift_err)?,
    };
    let mut flags = settings::builder();
    flags.set("is_pic", "true").map_err(cranelift_err)?;
    isa_builder
        .finish(settings::Flags::new(flags))
        .map_err(cranelift_err)
}

pub struct CodeGenerator {
    module: ObjectModule,
    ctx: codegen::Context,
    func_ids: HashMap<ir::FuncId, cranelift_module::FuncId>,
    /// String constants, one data object per IR global
    string_data: HashMap<ir::GlobalId, DataId>,
}

impl CodeGenerator {
    /// Code generator for the module's target triple (the host if unset).
    pub fn new(name: &str, triple: Option<&str>) -> CodegenResult<Self> {
        let isa = target_isa(triple)?;
        let builder = ObjectBuilder::new(isa, name, cranelift_module::default_libcall_names())
            .map_err(cranelift_err)?;

        Ok(CodeGenerator {
            module: ObjectModule::new(builder),
            ctx: codegen::Context::new(),
            func_ids: HashMap::new(),
            string_data: HashMap::new(),
        })
    }

    fn pointer_type(&self) -> Type {
        self.module.target_config().pointer_type()
    }

    /// Declare every function first (for forward references).
    ///
    /// Bodiless functions are imports. Variadic imports are declared with
    /// their fixed parameters only; call sites supply the rest.
    pub fn declare_functions(&mut self, ir_module: &ir::Module) -> CodegenResult<()> {
        let ptr_ty = self.pointer_type();
        for (id, func) in ir_module.functions() {
            let mut sig = self.module.make_signature();
            for param in &func.sig.params {
                let ty = ir_to_cranelift_type(*param, ptr_ty)
                    .ok_or_else(|| CodegenError::Unsupported(format!("void parameter in @{}", func.name)))?;
                sig.params.push(AbiParam::new(ty));
            }
            if let Some(ty) = ir_to_cranelift_type(func.sig.ret, ptr_ty) {
                sig.returns.push(AbiParam::new(ty));
            }

            let linkage = match (func.linkage, func.is_declaration()) {
                (ir::Linkage::External, true) => Linkage::Import,
                (ir::Linkage::External, false) => Linkage::Export,
                (ir::Linkage::Internal | ir::Linkage::Private, _) => Linkage::Local,
            };
            let func_id = self
                .module
                .declare_function(&func.name, linkage, &sig)
                .map_err(cranelift_err)?;
            self.func_ids.insert(id, func_id);
        }
        Ok(())
    }

    /// Create a read-only, NUL-terminated data object for each string constant.
    pub fn register_strings(&mut self, ir_module: &ir::Module) -> CodegenResult<()> {
        for (id, global) in ir_module.globals() {
            let data_id = self
                .module
                .declare_data(&global.name, Linkage::Local, false, false)
                .map_err(cranelift_err)?;

            let mut bytes = global.text.as_bytes().to_vec();
            bytes.push(0);
            let mut desc = DataDescription::new();
            desc.define(bytes.into_boxed_slice());
            self.module.define_data(data_id, &desc).map_err(cranelift_err)?;

            self.string_data.insert(id, data_id);
        }
        Ok(())
    }

    /// Generate code for one defined IR function.
    pub fn gen_function(&mut self, ir_module: &ir::Module, id: ir::FuncId) -> CodegenResult<()> {
        let ir_fn = ir_module.function(id);
        let func_id = *self
            .func_ids
            .get(&id)
            .ok_or_else(|| CodegenError::FunctionNotFound(ir_fn.name.clone()))?;

        self.ctx.clear();
        self.ctx.func.signature = self
            .module
            .declarations()
            .get_function_decl(func_id)
            .signature
            .clone();

        // Import callees and strings before the builder borrows ctx.func.
        let mut func_refs = HashMap::new();
        for (ir_id, fid) in &self.func_ids {
            let func_ref = self.module.declare_func_in_func(*fid, &mut self.ctx.func);
            func_refs.insert(*ir_id, func_ref);
        }
        let mut string_globals: HashMap<ir::GlobalId, GlobalValue> = HashMap::new();
        for (global, data_id) in &self.string_data {
            let gv = self.module.declare_data_in_func(*data_id, &mut self.ctx.func);
            string_globals.insert(*global, gv);
        }

        let ptr_ty = self.pointer_type();
        let call_conv = self.module.isa().default_call_conv();
        {
            let mut builder = FunctionBuilder::new(
                &mut self.ctx.func,
                ir_module,
                ir_fn,
                ptr_ty,
                call_conv,
                &func_refs,
                &string_globals,
            );
            builder.build()?;
        }

        self.module
            .define_function(func_id, &mut self.ctx)
            .map_err(cranelift_err)?;
        debug!(function = %ir_fn.name, "defined");
        Ok(())
    }

    /// Declare, define and translate everything in `ir_module`.
    pub fn compile_module(&mut self, ir_module: &ir::Module) -> CodegenResult<()> {
        self.declare_functions(ir_module)?;
        self.register_strings(ir_module)?;
        for (id, func) in ir_module.functions() {
            if !func.is_declaration() {
                self.gen_function(ir_module, id)?;
            }
        }
        Ok(())
    }

    /// Finish the module and return the object file bytes.
    pub fn finish(self) -> CodegenResult<Vec<u8>> {
        let product = self.module.finish();
        product.emit().map_err(cranelift_err)
    }

    /// Emit the final object file. Consumes self because finish() takes ownership.
    pub fn emit_object(self, path: &Path) -> CodegenResult<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Verify `ir_module` and translate it into an object file for its target.
///
/// Modules with verifier errors are refused: Cranelift would reject them
/// anyway, with far less useful messages.
pub fn compile(ir_module: &ir::Module) -> CodegenResult<Vec<u8>> {
    let problems = ir::verify(ir_module);
    if !problems.is_empty() {
        return Err(CodegenError::InvalidModule(problems.len()));
    }
    let mut generator = CodeGenerator::new(&ir_module.name, ir_module.target_triple.as_deref())?;
    generator.compile_module(ir_module)?;
    generator.finish()
}
