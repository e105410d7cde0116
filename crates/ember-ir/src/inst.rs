// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! IR instructions. Terminators are ordinary instructions.

use crate::{BlockId, FuncId, IrType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    FAdd,
    FSub,
    FMul,
    SDiv,
}

impl BinaryOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::FAdd => "fadd",
            BinaryOp::FSub => "fsub",
            BinaryOp::FMul => "fmul",
            BinaryOp::SDiv => "sdiv",
        }
    }

    /// True for the floating-point operations.
    pub fn is_float(self) -> bool {
        !matches!(self, BinaryOp::SDiv)
    }
}

/// Ordered floating-point comparison predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatPredicate {
    Olt,
    Ogt,
    Ole,
}

impl FloatPredicate {
    pub fn mnemonic(self) -> &'static str {
        match self {
            FloatPredicate::Olt => "olt",
            FloatPredicate::Ogt => "ogt",
            FloatPredicate::Ole => "ole",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    /// Reserve a stack slot; yields its address.
    Alloca { ty: IrType },
    Load { ty: IrType, ptr: Value },
    /// `volatile` stores may not be reordered or removed.
    Store { value: Value, ptr: Value, volatile: bool },
    Binary { op: BinaryOp, lhs: Value, rhs: Value },
    FCmp { pred: FloatPredicate, lhs: Value, rhs: Value },
    Call { callee: FuncId, args: Vec<Value> },
    /// Merge value: picks the incoming value of the predecessor taken.
    Phi { incoming: Vec<(Value, BlockId)> },
    Ret { value: Option<Value> },
    Br { target: BlockId },
    CondBr { cond: Value, then_block: BlockId, else_block: BlockId },
}

impl InstKind {
    pub fn is_terminator(&self) -> bool {
        matches!(self, InstKind::Ret { .. } | InstKind::Br { .. } | InstKind::CondBr { .. })
    }

    /// Value operands, in textual order. Phi blocks are not included.
    pub fn operands(&self) -> Vec<Value> {
        match self {
            InstKind::Alloca { .. } => vec![],
            InstKind::Load { ptr, .. } => vec![*ptr],
            InstKind::Store { value, ptr, .. } => vec![*value, *ptr],
            InstKind::Binary { lhs, rhs, .. } | InstKind::FCmp { lhs, rhs, .. } => vec![*lhs, *rhs],
            InstKind::Call { args, .. } => args.clone(),
            InstKind::Phi { incoming } => incoming.iter().map(|(v, _)| *v).collect(),
            InstKind::Ret { value } => value.iter().copied().collect(),
            InstKind::Br { .. } => vec![],
            InstKind::CondBr { cond, .. } => vec![*cond],
        }
    }

    /// Blocks control may transfer to.
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            InstKind::Br { target } => vec![*target],
            InstKind::CondBr { then_block, else_block, .. } => vec![*then_block, *else_block],
            _ => vec![],
        }
    }
}

/// An instruction together with its result type and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct InstData {
    pub kind: InstKind,
    /// Result type; `Void` for instructions that produce nothing.
    pub ty: IrType,
    pub name: Option<String>,
    pub block: BlockId,
}
