// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! IR module - functions plus module-level string constants.

use std::collections::HashMap;

use crate::{Function, Linkage, Signature, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId(pub u32);

/// Private constant holding a NUL-terminated string.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalString {
    pub name: String,
    /// Contents without the terminating NUL
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub target_triple: Option<String>,
    functions: Vec<Function>,
    globals: Vec<GlobalString>,
    names: HashMap<String, u32>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_triple: None,
            functions: Vec::new(),
            globals: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Functions and globals share one namespace; clashes get a `.N` suffix.
    fn unique_name(&mut self, base: &str) -> String {
        let count = self.names.entry(base.to_string()).or_insert(0);
        let name = if *count == 0 {
            base.to_string()
        } else {
            format!("{}.{}", base, count)
        };
        *count += 1;
        name
    }

    /// Create a function without a body. Add blocks to define it.
    pub fn add_function(&mut self, name: &str, sig: Signature, linkage: Linkage) -> FuncId {
        let name = self.unique_name(name);
        let id = FuncId(self.functions.len() as u32);
        self.functions.push(Function::new(name, sig, linkage));
        id
    }

    /// Look a function up by its (possibly uniqued) name.
    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.functions
            .iter()
            .position(|f| f.name == name)
            .map(|i| FuncId(i as u32))
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0 as usize]
    }

    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.0 as usize]
    }

    pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FuncId(i as u32), f))
    }

    /// Add a private string constant and return its address.
    pub fn add_global_string(&mut self, name_hint: &str, text: &str) -> Value {
        let name = self.unique_name(name_hint);
        let id = crate::GlobalId(self.globals.len() as u32);
        self.globals.push(GlobalString {
            name,
            text: text.to_string(),
        });
        Value::Global(id)
    }

    pub fn global(&self, id: GlobalId) -> &GlobalString {
        &self.globals[id.0 as usize]
    }

    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &GlobalString)> {
        self.globals
            .iter()
            .enumerate()
            .map(|(i, g)| (GlobalId(i as u32), g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IrType;

    #[test]
    fn duplicate_function_names_are_suffixed() {
        let mut m = Module::new("main");
        let sig = Signature::new(vec![], IrType::Void);
        let a = m.add_function("f", sig.clone(), Linkage::Internal);
        let b = m.add_function("f", sig, Linkage::Internal);
        assert_eq!(m.function(a).name, "f");
        assert_eq!(m.function(b).name, "f.1");
        assert_eq!(m.get_function("f"), Some(a));
        assert_eq!(m.get_function("missing"), None);
    }

    #[test]
    fn global_strings_get_unique_names() {
        let mut m = Module::new("main");
        let a = m.add_global_string("str", "a");
        let b = m.add_global_string("str", "b");
        match (a, b) {
            (Value::Global(a), Value::Global(b)) => {
                assert_eq!(m.global(a).name, "str");
                assert_eq!(m.global(b).name, "str.1");
                assert_eq!(m.global(b).text, "b");
            }
            other => panic!("expected globals, got {:?}", other),
        }
    }
}
