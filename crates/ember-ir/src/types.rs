// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! IR types, constants and value references.

use crate::{GlobalId, InstId};

/// IR type. `Str` is a pointer to a NUL-terminated byte sequence, `Ptr` is
/// the address of a stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    I1,
    I32,
    I64,
    F64,
    Str,
    Ptr,
}

impl IrType {
    /// Byte size of this type.
    pub fn size(self) -> u32 {
        match self {
            IrType::Void => 0,
            IrType::I1 => 1,
            IrType::I32 => 4,
            IrType::I64 | IrType::F64 | IrType::Str | IrType::Ptr => 8,
        }
    }

    pub fn is_void(self) -> bool {
        self == IrType::Void
    }

    pub fn is_float(self) -> bool {
        self == IrType::F64
    }

    /// True for I1, I32 and I64.
    pub fn is_int(self) -> bool {
        matches!(self, IrType::I1 | IrType::I32 | IrType::I64)
    }
}

/// Constant operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
}

impl Constant {
    pub fn ty(self) -> IrType {
        match self {
            Constant::Int(_) => IrType::I64,
            Constant::Float(_) => IrType::F64,
        }
    }
}

/// Reference to a value, valid within one function of one module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Const(Constant),
    /// Result of an instruction
    Inst(InstId),
    /// Incoming function argument, by position
    Param(u32),
    /// Address of a module-level string
    Global(GlobalId),
}

impl Value {
    pub fn int(v: i64) -> Self {
        Value::Const(Constant::Int(v))
    }

    pub fn float(v: f64) -> Self {
        Value::Const(Constant::Float(v))
    }

    pub fn as_inst(self) -> Option<InstId> {
        match self {
            Value::Inst(id) => Some(id),
            _ => None,
        }
    }
}
