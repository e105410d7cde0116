// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Textual dump of IR modules.
//!
//! ```text
//! ; module main
//! @new_line = private constant c"\0A\00"
//!
//! declare i32 @printf(str, ...)
//!
//! define external void @main() {
//! entry:
//!   %x.0 = alloca i64
//!   store volatile i64 42, ptr %x.0
//!   ret void
//! }
//! ```

use std::fmt::{self, Write as _};

use crate::*;

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IrType::Void => "void",
            IrType::I1 => "i1",
            IrType::I32 => "i32",
            IrType::I64 => "i64",
            IrType::F64 => "f64",
            IrType::Str => "str",
            IrType::Ptr => "ptr",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            // Debug keeps the fractional part: 1.0, not 1
            Constant::Float(v) => write!(f, "{:?}", v),
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Linkage::External => "external",
            Linkage::Internal => "internal",
            Linkage::Private => "private",
        };
        f.write_str(s)
    }
}

/// Escape a string constant the way LLVM prints `c"..."` arrays.
fn escape_bytes(text: &str) -> String {
    let mut out = String::new();
    for b in text.bytes() {
        if (b.is_ascii_graphic() && b != b'"' && b != b'\\') || b == b' ' {
            out.push(b as char);
        } else {
            let _ = write!(out, "\\{:02X}", b);
        }
    }
    out.push_str("\\00");
    out
}

/// Prints values with the names they have inside one function.
struct ValueNames<'a> {
    module: &'a Module,
    func: &'a Function,
}

impl ValueNames<'_> {
    fn name(&self, value: Value) -> String {
        match value {
            Value::Const(c) => c.to_string(),
            Value::Inst(id) => match &self.func.inst(id).name {
                Some(name) => format!("%{}.{}", name, id.0),
                None => format!("%{}", id.0),
            },
            Value::Param(i) => format!("%{}", self.func.param_name(i as usize)),
            Value::Global(id) => format!("@{}", self.module.global(id).name),
        }
    }

    fn typed(&self, value: Value) -> String {
        format!("{} {}", self.func.value_type(value), self.name(value))
    }

    fn label(&self, block: BlockId) -> String {
        format!("%{}", self.func.block(block).name)
    }

    fn inst(&self, id: InstId, data: &InstData) -> String {
        let mut out = String::new();
        if !data.ty.is_void() {
            let _ = write!(out, "{} = ", self.name(Value::Inst(id)));
        }
        let body = match &data.kind {
            InstKind::Alloca { ty } => format!("alloca {}", ty),
            InstKind::Load { ty, ptr } => format!("load {}, {}", ty, self.typed(*ptr)),
            InstKind::Store { value, ptr, volatile } => format!(
                "store {}{}, {}",
                if *volatile { "volatile " } else { "" },
                self.typed(*value),
                self.typed(*ptr)
            ),
            InstKind::Binary { op, lhs, rhs } => format!(
                "{} {}, {}",
                op.mnemonic(),
                self.typed(*lhs),
                self.name(*rhs)
            ),
            InstKind::FCmp { pred, lhs, rhs } => format!(
                "fcmp {} {}, {}",
                pred.mnemonic(),
                self.typed(*lhs),
                self.name(*rhs)
            ),
            InstKind::Call { callee, args } => {
                let args: Vec<String> = args.iter().map(|a| self.typed(*a)).collect();
                format!(
                    "call {} @{}({})",
                    data.ty,
                    self.module.function(*callee).name,
                    args.join(", ")
                )
            }
            InstKind::Phi { incoming } => {
                let arms: Vec<String> = incoming
                    .iter()
                    .map(|(v, b)| format!("[ {}, {} ]", self.name(*v), self.label(*b)))
                    .collect();
                format!("phi {} {}", data.ty, arms.join(", "))
            }
            InstKind::Ret { value: Some(v) } => format!("ret {}", self.typed(*v)),
            InstKind::Ret { value: None } => "ret void".to_string(),
            InstKind::Br { target } => format!("br label {}", self.label(*target)),
            InstKind::CondBr { cond, then_block, else_block } => format!(
                "br {}, label {}, label {}",
                self.typed(*cond),
                self.label(*then_block),
                self.label(*else_block)
            ),
        };
        out.push_str(&body);
        out
    }
}

fn write_function(f: &mut fmt::Formatter<'_>, module: &Module, func: &Function) -> fmt::Result {
    let names = ValueNames { module, func };

    if func.is_declaration() {
        let mut params: Vec<String> = func.sig.params.iter().map(|t| t.to_string()).collect();
        if func.sig.variadic {
            params.push("...".to_string());
        }
        return writeln!(f, "declare {} @{}({})", func.sig.ret, func.name, params.join(", "));
    }

    let params: Vec<String> = func
        .sig
        .params
        .iter()
        .enumerate()
        .map(|(i, ty)| format!("{} %{}", ty, func.param_name(i)))
        .collect();
    writeln!(
        f,
        "define {} {} @{}({}) {{",
        func.linkage,
        func.sig.ret,
        func.name,
        params.join(", ")
    )?;
    for (i, (id, block)) in func.blocks().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        writeln!(f, "{}:", block.name)?;
        for (inst_id, data) in func.block_insts(id) {
            writeln!(f, "  {}", names.inst(inst_id, data))?;
        }
    }
    writeln!(f, "}}")
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        if let Some(triple) = &self.target_triple {
            writeln!(f, "target triple = \"{}\"", triple)?;
        }
        for (_, global) in self.globals() {
            writeln!(
                f,
                "@{} = private constant c\"{}\"",
                global.name,
                escape_bytes(&global.text)
            )?;
        }
        for (_, func) in self.functions() {
            writeln!(f)?;
            write_function(f, self, func)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_newlines_and_quotes() {
        assert_eq!(escape_bytes("a\nb"), "a\\0Ab\\00");
        assert_eq!(escape_bytes("say \"hi\""), "say \\22hi\\22\\00");
    }

    #[test]
    fn float_constants_keep_fraction() {
        assert_eq!(Constant::Float(1.0).to_string(), "1.0");
        assert_eq!(Constant::Int(-7).to_string(), "-7");
    }

    #[test]
    fn dumps_a_small_function() {
        let mut m = Module::new("demo");
        let printf = m.add_function("printf", Signature::variadic(vec![IrType::Str], IrType::I32), Linkage::External);
        let hello = m.add_global_string("str", "hi\n");
        let main = m.add_function("main", Signature::new(vec![], IrType::Void), Linkage::External);
        let func = m.function_mut(main);
        let entry = func.create_block("entry");
        let mut b = InstBuilder::new(func, entry);
        let slot = b.alloca(IrType::I64, "x");
        b.store(Value::int(42), slot, true);
        b.call(printf, IrType::I32, vec![hello]);
        b.ret(None);

        let text = m.to_string();
        assert!(text.contains("@str = private constant c\"hi\\0A\\00\""), "{}", text);
        assert!(text.contains("declare i32 @printf(str, ...)"), "{}", text);
        assert!(text.contains("define external void @main() {"), "{}", text);
        assert!(text.contains("%x.0 = alloca i64"), "{}", text);
        assert!(text.contains("store volatile i64 42, ptr %x.0"), "{}", text);
        assert!(text.contains("%2 = call i32 @printf(str @str)"), "{}", text);
        assert!(text.contains("  ret void"), "{}", text);
    }
}
