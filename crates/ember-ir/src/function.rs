// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! IR function representation - control-flow graph of basic blocks.

use std::collections::HashMap;

use crate::{InstData, InstKind, IrError, IrType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Visible outside the module (entry point, imports)
    External,
    /// Module-local user function
    Internal,
    /// Module-local runtime helper
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<IrType>,
    pub ret: IrType,
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<IrType>, ret: IrType) -> Self {
        Self { params, ret, variadic: false }
    }

    pub fn variadic(params: Vec<IrType>, ret: IrType) -> Self {
        Self { params, ret, variadic: true }
    }
}

/// Basic block: an ordered instruction list. Well-formed blocks end in
/// exactly one terminator.
#[derive(Debug, Clone)]
pub struct BlockData {
    pub name: String,
    pub insts: Vec<InstId>,
}

/// IR function. A function without blocks is a declaration.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub sig: Signature,
    pub linkage: Linkage,
    param_names: Vec<String>,
    blocks: Vec<BlockData>,
    insts: Vec<InstData>,
    block_names: HashMap<String, u32>,
}

impl Function {
    pub fn new(name: String, sig: Signature, linkage: Linkage) -> Self {
        let param_names = (0..sig.params.len()).map(|i| format!("arg{}", i)).collect();
        Self {
            name,
            sig,
            linkage,
            param_names,
            blocks: Vec::new(),
            insts: Vec::new(),
            block_names: HashMap::new(),
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Incoming argument `index` as a value.
    pub fn param(&self, index: usize) -> Value {
        Value::Param(index as u32)
    }

    pub fn param_name(&self, index: usize) -> &str {
        self.param_names.get(index).map(String::as_str).unwrap_or("arg")
    }

    pub fn set_param_name(&mut self, index: usize, name: &str) {
        if let Some(slot) = self.param_names.get_mut(index) {
            *slot = name.to_string();
        }
    }

    /// Append a new empty block. Names are made unique within the function.
    pub fn create_block(&mut self, name: &str) -> BlockId {
        let count = self.block_names.entry(name.to_string()).or_insert(0);
        let unique = if *count == 0 {
            name.to_string()
        } else {
            format!("{}{}", name, count)
        };
        *count += 1;
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BlockData {
            name: unique,
            insts: Vec::new(),
        });
        id
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        if self.blocks.is_empty() {
            None
        } else {
            Some(BlockId(0))
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BlockData)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (BlockId(i as u32), b))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id.0 as usize]
    }

    pub fn inst(&self, id: InstId) -> &InstData {
        &self.insts[id.0 as usize]
    }

    pub fn inst_count(&self) -> usize {
        self.insts.len()
    }

    /// Append an instruction at the end of `block`, terminated or not.
    pub fn push_inst(&mut self, block: BlockId, kind: InstKind, ty: IrType, name: Option<&str>) -> InstId {
        let id = InstId(self.insts.len() as u32);
        self.insts.push(InstData {
            kind,
            ty,
            name: name.map(str::to_string),
            block,
        });
        self.blocks[block.0 as usize].insts.push(id);
        id
    }

    pub fn set_value_name(&mut self, value: Value, name: &str) {
        if let Value::Inst(id) = value {
            if let Some(data) = self.insts.get_mut(id.0 as usize) {
                data.name = Some(name.to_string());
            }
        }
    }

    /// Record `value` as the phi's input when control arrives from `from`.
    pub fn add_phi_incoming(&mut self, phi: Value, value: Value, from: crate::BlockId) -> Result<(), IrError> {
        let data = phi
            .as_inst()
            .and_then(|id| self.insts.get_mut(id.0 as usize));
        match data {
            Some(InstData { kind: InstKind::Phi { incoming }, .. }) => {
                incoming.push((value, from));
                Ok(())
            }
            _ => Err(IrError::NotAPhi(format!("{:?}", phi))),
        }
    }

    /// Type of a value as seen from inside this function.
    pub fn value_type(&self, value: Value) -> IrType {
        match value {
            Value::Const(c) => c.ty(),
            Value::Inst(id) => self
                .insts
                .get(id.0 as usize)
                .map(|d| d.ty)
                .unwrap_or(IrType::Void),
            Value::Param(i) => self
                .sig
                .params
                .get(i as usize)
                .copied()
                .unwrap_or(IrType::Void),
            Value::Global(_) => IrType::Str,
        }
    }

    /// The stored type when `value` is the address of a stack slot.
    pub fn slot_type(&self, value: Value) -> Option<IrType> {
        let id = value.as_inst()?;
        match self.insts.get(id.0 as usize)?.kind {
            InstKind::Alloca { ty } => Some(ty),
            _ => None,
        }
    }

    /// The last instruction of `block`, if it is a terminator.
    pub fn terminator(&self, block: BlockId) -> Option<&InstKind> {
        let last = *self.blocks[block.0 as usize].insts.last()?;
        let kind = &self.insts[last.0 as usize].kind;
        if kind.is_terminator() {
            Some(kind)
        } else {
            None
        }
    }

    pub fn is_terminated(&self, block: BlockId) -> bool {
        self.terminator(block).is_some()
    }

    /// Instructions of `block` in order.
    pub fn block_insts(&self, block: BlockId) -> impl Iterator<Item = (InstId, &InstData)> {
        self.blocks[block.0 as usize]
            .insts
            .iter()
            .map(move |id| (*id, &self.insts[id.0 as usize]))
    }
}
