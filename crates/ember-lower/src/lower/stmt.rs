// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Statement lowering: returns, declarations, nested blocks.

use ember_ast::{Expr, FnDecl, Stmt, StmtKind, VarDecl};
use ember_ir::{FuncId, IrType, Linkage, Signature, Value};
use tracing::{debug, trace};

use super::{type_of, Lowerer};
use crate::scope::{Cursor, DeclInfo, DeclKind};
use crate::LowerResult;

impl<'a> Lowerer<'a> {
    pub fn lower_stmt(&mut self, stmt: &Stmt) -> LowerResult<Option<Value>> {
        trace!(node = stmt.id.0, kind = stmt.kind_name(), "lowering");
        match &stmt.kind {
            StmtKind::Expr(expr) => self.lower_expr(expr),
            StmtKind::Return(value) => self.lower_return(value.as_ref()).map(Some),
            StmtKind::Var(decl) => self.lower_var(stmt, decl),
            StmtKind::Fn(decl) => self.lower_fn(decl),
            // Nested blocks share the enclosing scope.
            StmtKind::Block(block) => self.lower_block(block),
        }
    }

    fn lower_return(&mut self, value: Option<&Expr>) -> LowerResult<Value> {
        let value = match value {
            Some(expr) => Some(self.lower_operand(expr, "return value")?),
            None => None,
        };
        Ok(self.builder()?.ret(value))
    }

    fn lower_var(&mut self, stmt: &Stmt, decl: &VarDecl) -> LowerResult<Option<Value>> {
        let Some(init) = &decl.init else {
            return self.lower_ident(&decl.name).map(Some);
        };
        let ty = type_of(&decl.ty);
        let slot = self.builder()?.alloca(ty, &decl.name);
        let id = self.add_decl(DeclInfo {
            node: stmt.id,
            name: decl.name.clone(),
            ty,
            kind: DeclKind::Variable,
        });
        self.scopes.declare(&decl.name, slot, Some(id))?;
        self.lower_assign(&decl.name, init)?;
        Ok(Some(slot))
    }

    fn lower_fn(&mut self, decl: &FnDecl) -> LowerResult<Option<Value>> {
        let params: Vec<IrType> = decl.params.iter().map(|p| type_of(&p.ty)).collect();
        let ret = decl.ret_ty.as_deref().map_or(IrType::Void, type_of);
        let func = self
            .module
            .add_function(&decl.name, Signature::new(params, ret), Linkage::Internal);
        let function = self.module.function_mut(func);
        for (i, param) in decl.params.iter().enumerate() {
            function.set_param_name(i, &param.name);
        }
        let entry = function.create_block("entry");
        debug!(name = %function.name, params = decl.params.len(), "function");

        self.scopes.push(Cursor { func, block: entry });
        let body = self.lower_fn_body(func, decl, ret);
        self.scopes.pop()?;
        body?;
        Ok(None)
    }

    fn lower_fn_body(&mut self, func: FuncId, decl: &FnDecl, ret: IrType) -> LowerResult<()> {
        for (i, param) in decl.params.iter().enumerate() {
            let value = self.module.function(func).param(i);
            let id = self.add_decl(DeclInfo {
                node: param.id,
                name: param.name.clone(),
                ty: type_of(&param.ty),
                kind: DeclKind::Parameter,
            });
            self.scopes.declare(&param.name, value, Some(id))?;
        }

        self.lower_block(&decl.body)?;

        // Shallow scan: returns nested in blocks or branches are not seen.
        if ret.is_void() && !decl.body.has_top_level_return() {
            self.builder()?.ret(None);
        }
        Ok(())
    }
}
