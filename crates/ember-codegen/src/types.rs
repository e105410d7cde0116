// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! IrType → Cranelift type translation.

use cranelift::prelude::*;
use ember_ir::IrType;

/// Cranelift type of an IR value, or `None` for `void`.
///
/// Strings and slot addresses are pointer-sized integers. `i1` is a byte,
/// which is what `fcmp` produces.
pub fn ir_to_cranelift_type(ty: IrType, ptr_ty: Type) -> Option<Type> {
    match ty {
        IrType::Void => None,
        IrType::I1 => Some(types::I8),
        IrType::I32 => Some(types::I32),
        IrType::I64 => Some(types::I64),
        IrType::F64 => Some(types::F64),
        IrType::Str | IrType::Ptr => Some(ptr_ty),
    }
}

/// Stack slot alignment as a power of two.
pub fn align_shift(ty: IrType) -> u8 {
    match ty.size() {
        0 | 1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    }
}
