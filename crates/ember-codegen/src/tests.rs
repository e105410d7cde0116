// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Codegen tests - lowered programs translate to Cranelift and produce object files.

#[cfg(test)]
mod tests {
    use ember_ast::{AstBuilder, BinOp, Block};
    use ember_ir::{InstBuilder, IrType, Linkage, Module, Signature, Value};
    use ember_lower::{lower_program, LowerOptions};

    use crate::{compile, host_triple, CodeGenerator, CodegenError};

    const LINUX: &str = "x86_64-unknown-linux-gnu";

    fn lower(root: &Block) -> Module {
        let options = LowerOptions::default().with_target_triple(LINUX);
        let lowered = lower_program(root, &options).unwrap();
        assert!(lowered.is_clean(), "{:?}", lowered.errors);
        lowered.module
    }

    fn is_elf(bytes: &[u8]) -> bool {
        bytes.starts_with(b"\x7fELF")
    }

    // ═══════════════════════════════════════════════════════════
    // Whole programs
    // ═══════════════════════════════════════════════════════════

    #[test]
    fn codegen_empty_program() {
        let module = lower(&Block::default());
        let bytes = compile(&module).unwrap();
        assert!(is_elf(&bytes));
    }

    #[test]
    fn codegen_hello() {
        // println("hello")
        let mut b = AstBuilder::new();
        let text = b.string("\"hello\"");
        let call = b.call("println", vec![text]);
        let stmt = b.expr_stmt(call);
        let root = b.block(vec![stmt]);

        let bytes = compile(&lower(&root)).unwrap();
        assert!(is_elf(&bytes));
    }

    #[test]
    fn codegen_slots_and_arithmetic() {
        // double d = 1.5 * 2.0; int q = 7 / 2; printf("%f %d", d, q)
        let mut b = AstBuilder::new();
        let l = b.double(1.5);
        let r = b.double(2.0);
        let product = b.binary(BinOp::Mul, l, r);
        let d = b.var("double", "d", product);
        let l = b.int(7);
        let r = b.int(2);
        let quotient = b.binary(BinOp::Div, l, r);
        let q = b.var("int", "q", quotient);
        let fmt = b.string("\"%f %d\"");
        let d_ref = b.ident("d");
        let q_ref = b.ident("q");
        let print = b.call("printf", vec![fmt, d_ref, q_ref]);
        let print = b.expr_stmt(print);
        let root = b.block(vec![d, q, print]);

        compile(&lower(&root)).unwrap();
    }

    #[test]
    fn codegen_counting_loop() {
        // loop from 1.0 until 5.0 { printf("%f", i) }
        let mut b = AstBuilder::new();
        let fmt = b.string("\"%f\"");
        let i = b.ident("i");
        let print = b.call("printf", vec![fmt, i]);
        let print = b.expr_stmt(print);
        let body = b.block(vec![print]);
        let from = b.double(1.0);
        let until = b.double(5.0);
        let lp = b.counting_loop(from, until, body);
        let lp = b.expr_stmt(lp);
        let root = b.block(vec![lp]);

        compile(&lower(&root)).unwrap();
    }

    #[test]
    fn codegen_function_with_branches() {
        // int pick(double a) { if (a < 2.0) { return 1 } else { return 2 } }
        let mut b = AstBuilder::new();
        let param = b.param("double", "a");
        let a = b.ident("a");
        let two = b.double(2.0);
        let cond = b.binary(BinOp::Lt, a, two);
        let one = b.int(1);
        let then_ret = b.ret(one);
        let then_block = b.block(vec![then_ret]);
        let two = b.int(2);
        let else_ret = b.ret(two);
        let else_block = b.block(vec![else_ret]);
        let branch = b.if_else(cond, then_block, else_block);
        let branch = b.expr_stmt(branch);
        let body = b.block(vec![branch]);
        let pick = b.func(Some("int"), "pick", vec![param], body);
        let arg = b.double(3.0);
        let call = b.call("pick", vec![arg]);
        let call = b.expr_stmt(call);
        let root = b.block(vec![pick, call]);

        compile(&lower(&root)).unwrap();
    }

    // ═══════════════════════════════════════════════════════════
    // Refusals and configuration
    // ═══════════════════════════════════════════════════════════

    #[test]
    fn codegen_refuses_unverified_module() {
        let mut module = Module::new("bad");
        let f = module.add_function("f", Signature::new(vec![], IrType::Void), Linkage::External);
        module.function_mut(f).create_block("entry");

        match compile(&module) {
            Err(CodegenError::InvalidModule(1)) => {}
            other => panic!("expected InvalidModule(1), got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn codegen_unknown_target() {
        let module = Module::new("m");
        let err = CodeGenerator::new(&module.name, Some("not-a-real-target")).err().unwrap();
        assert!(matches!(err, CodegenError::UnknownTarget(t) if t == "not-a-real-target"));
    }

    #[test]
    fn codegen_host_target() {
        let mut module = Module::new("host");
        let f = module.add_function("main", Signature::new(vec![], IrType::Void), Linkage::External);
        let entry = module.function_mut(f).create_block("entry");
        InstBuilder::new(module.function_mut(f), entry).ret(None);

        assert!(!host_triple().is_empty());
        let bytes = compile(&module).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn codegen_returns_parameter() {
        let mut module = Module::new("m");
        module.target_triple = Some(LINUX.to_string());
        let f = module.add_function("id", Signature::new(vec![IrType::I64], IrType::I64), Linkage::External);
        let entry = module.function_mut(f).create_block("entry");
        InstBuilder::new(module.function_mut(f), entry).ret(Some(Value::Param(0)));

        let mut gen = CodeGenerator::new("m", Some(LINUX)).unwrap();
        gen.compile_module(&module).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.o");
        gen.emit_object(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(is_elf(&bytes));
    }
}
