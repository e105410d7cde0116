// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Scope stack - one binding table per open control-flow region.
//!
//! Tables are snapshots, not a chain: a branch or loop body starts from a
//! full copy of its parent's table, and nothing it declares flows back out
//! when it closes. Lookups only ever consult the innermost table.

use std::collections::HashMap;

use ember_ast::NodeId;
use ember_ir::{BlockId, FuncId, IrType, Value};

use crate::{LowerError, LowerResult};

/// Where instructions for the innermost region are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub func: FuncId,
    pub block: BlockId,
}

/// Index into the lowering engine's declaration arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Variable,
    Parameter,
}

/// What the engine remembers about a variable or parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclInfo {
    pub node: NodeId,
    pub name: String,
    pub ty: IrType,
    pub kind: DeclKind,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub cursor: Cursor,
    bindings: HashMap<String, Value>,
    decls: HashMap<String, DeclId>,
}

impl Scope {
    fn empty(cursor: Cursor) -> Self {
        Self {
            cursor,
            bindings: HashMap::new(),
            decls: HashMap::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Open an empty table for the region starting at `cursor`.
    pub fn push(&mut self, cursor: Cursor) {
        self.frames.push(Scope::empty(cursor));
    }

    /// Open a table pre-populated with a copy of the innermost one.
    pub fn push_copy(&mut self, cursor: Cursor) -> LowerResult<()> {
        let parent = self.frames.last().ok_or(LowerError::NoActiveScope)?;
        let frame = Scope {
            cursor,
            bindings: parent.bindings.clone(),
            decls: parent.decls.clone(),
        };
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> LowerResult<Scope> {
        self.frames.pop().ok_or(LowerError::ScopeUnderflow)
    }

    pub fn cursor(&self) -> LowerResult<Cursor> {
        self.frames
            .last()
            .map(|s| s.cursor)
            .ok_or(LowerError::NoActiveScope)
    }

    pub fn resolve(&self, name: &str) -> Option<Value> {
        self.frames.last()?.bindings.get(name).copied()
    }

    pub fn decl_of(&self, name: &str) -> Option<DeclId> {
        self.frames.last()?.decls.get(name).copied()
    }

    /// Bind `name` in the innermost table, replacing any earlier binding.
    /// `decl` is recorded when the binding comes from a declaration.
    pub fn declare(&mut self, name: &str, value: Value, decl: Option<DeclId>) -> LowerResult<()> {
        let frame = self.frames.last_mut().ok_or(LowerError::NoActiveScope)?;
        frame.bindings.insert(name.to_string(), value);
        match decl {
            Some(id) => {
                frame.decls.insert(name.to_string(), id);
            }
            None => {
                frame.decls.remove(name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(block: u32) -> Cursor {
        Cursor {
            func: FuncId(0),
            block: BlockId(block),
        }
    }

    #[test]
    fn copies_do_not_leak_back() {
        let mut scopes = ScopeStack::new();
        scopes.push(cursor(0));
        scopes.declare("x", Value::int(1), Some(DeclId(0))).unwrap();

        scopes.push_copy(cursor(1)).unwrap();
        assert_eq!(scopes.resolve("x"), Some(Value::int(1)));
        assert_eq!(scopes.decl_of("x"), Some(DeclId(0)));
        scopes.declare("x", Value::int(2), Some(DeclId(1))).unwrap();
        scopes.declare("y", Value::int(3), None).unwrap();
        assert_eq!(scopes.resolve("x"), Some(Value::int(2)));
        scopes.pop().unwrap();

        assert_eq!(scopes.resolve("x"), Some(Value::int(1)));
        assert_eq!(scopes.decl_of("x"), Some(DeclId(0)));
        assert_eq!(scopes.resolve("y"), None);
        assert_eq!(scopes.cursor().unwrap(), cursor(0));
    }

    #[test]
    fn fresh_scope_sees_nothing() {
        let mut scopes = ScopeStack::new();
        scopes.push(cursor(0));
        scopes.declare("x", Value::int(1), None).unwrap();
        scopes.push(cursor(1));
        assert_eq!(scopes.resolve("x"), None);
        assert_eq!(scopes.depth(), 2);
    }

    #[test]
    fn rebinding_without_declaration_clears_metadata() {
        let mut scopes = ScopeStack::new();
        scopes.push(cursor(0));
        scopes.declare("i", Value::int(0), Some(DeclId(4))).unwrap();
        scopes.declare("i", Value::float(1.0), None).unwrap();
        assert_eq!(scopes.decl_of("i"), None);
    }

    #[test]
    fn empty_stack_is_an_error_not_a_panic() {
        let mut scopes = ScopeStack::new();
        assert_eq!(scopes.pop().unwrap_err(), LowerError::ScopeUnderflow);
        assert_eq!(scopes.cursor().unwrap_err(), LowerError::NoActiveScope);
        assert_eq!(scopes.push_copy(cursor(0)).unwrap_err(), LowerError::NoActiveScope);
        assert_eq!(
            scopes.declare("x", Value::int(0), None).unwrap_err(),
            LowerError::NoActiveScope
        );
        assert_eq!(scopes.resolve("x"), None);
    }
}
