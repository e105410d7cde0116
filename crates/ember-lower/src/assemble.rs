// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Module assembly: runtime helper, entry function, top-level lowering.

use ember_ast::Block;
use ember_ir::{FuncId, InstBuilder, IrType, Linkage, Module, Signature};
use tracing::{debug, info};

use crate::scope::Cursor;
use crate::{LowerError, LowerOptions, LowerResult, Lowerer};

/// A lowered module and the diagnostics recorded while building it.
#[derive(Debug)]
pub struct Lowered {
    pub module: Module,
    pub errors: Vec<LowerError>,
}

impl Lowered {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The module, if nothing was diagnosed.
    pub fn into_result(self) -> Result<Module, Vec<LowerError>> {
        if self.errors.is_empty() {
            Ok(self.module)
        } else {
            Err(self.errors)
        }
    }
}

fn declare_printf(module: &mut Module) -> FuncId {
    module.get_function("printf").unwrap_or_else(|| {
        module.add_function(
            "printf",
            Signature::variadic(vec![IrType::Str], IrType::I32),
            Linkage::External,
        )
    })
}

/// Emit the string output helper: prints its argument, then a newline.
pub fn emit_runtime_helper(module: &mut Module, name: &str) -> FuncId {
    let printf = declare_printf(module);
    let new_line = module.add_global_string("new_line", "\n");
    let helper = module.add_function(
        name,
        Signature::new(vec![IrType::Str], IrType::Void),
        Linkage::Private,
    );

    let function = module.function_mut(helper);
    function.set_param_name(0, "text");
    let entry = function.create_block("entry");
    let text = function.param(0);
    let mut b = InstBuilder::new(function, entry);
    b.call(printf, IrType::I32, vec![text]);
    b.call(printf, IrType::I32, vec![new_line]);
    b.ret(None);
    helper
}

/// Lower a whole program into a fresh module.
///
/// The top-level statements become the body of the external entry function.
/// Under [`ErrorPolicy::BestEffort`](crate::ErrorPolicy::BestEffort) failing
/// statements are skipped and reported in [`Lowered::errors`]; otherwise the
/// first error is returned.
pub fn lower_program(root: &Block, options: &LowerOptions) -> LowerResult<Lowered> {
    let mut module = Module::new(options.module_name.clone());
    module.target_triple = options.target_triple.clone();
    emit_runtime_helper(&mut module, &options.helper_name);

    let main = module.add_function(
        &options.entry_name,
        Signature::new(Vec::new(), IrType::Void),
        Linkage::External,
    );
    let entry = module.function_mut(main).create_block("entry");
    debug!(entry = %options.entry_name, statements = root.stmts.len(), "lowering program");

    let errors = {
        let mut lowerer = Lowerer::new(&mut module, options);
        lowerer.scopes_mut().push(Cursor { func: main, block: entry });
        lowerer.lower_block(root)?;
        lowerer.scopes_mut().pop()?;
        lowerer.into_errors()
    };

    let function = module.function_mut(main);
    if !function.is_terminated(entry) {
        InstBuilder::new(function, entry).ret(None);
    }

    info!(module = %module.name, errors = errors.len(), "lowered");
    Ok(Lowered { module, errors })
}
