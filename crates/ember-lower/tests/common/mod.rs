// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Test helpers: a tiny IR interpreter with captured `printf` output.

#![allow(dead_code)]

use std::collections::HashMap;

use ember_ast::Block;
use ember_ir::{BinaryOp, BlockId, Constant, FloatPredicate, FuncId, InstKind, Module, Value};
use ember_lower::{lower_program, LowerOptions, Lowered};

const STEP_LIMIT: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Ptr(usize),
    Void,
}

pub struct Machine<'m> {
    module: &'m Module,
    memory: Vec<Val>,
    steps: usize,
    pub output: String,
}

impl<'m> Machine<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            module,
            memory: Vec::new(),
            steps: 0,
            output: String::new(),
        }
    }

    pub fn run(&mut self, name: &str) -> Result<Val, String> {
        let func = self
            .module
            .get_function(name)
            .ok_or_else(|| format!("no function {name}"))?;
        self.call(func, Vec::new())
    }

    fn call(&mut self, id: FuncId, args: Vec<Val>) -> Result<Val, String> {
        let module = self.module;
        let func = module.function(id);
        if func.name == "printf" {
            self.printf(&args)?;
            return Ok(Val::Int(0));
        }
        let mut block = func.entry_block().ok_or_else(|| format!("@{} has no body", func.name))?;
        let mut prev: Option<BlockId> = None;
        let mut env: HashMap<u32, Val> = HashMap::new();

        loop {
            let mut next = None;
            for (inst_id, inst) in func.block_insts(block) {
                self.steps += 1;
                if self.steps > STEP_LIMIT {
                    return Err("step limit exceeded".to_string());
                }
                let eval = |v: &Value, env: &HashMap<u32, Val>, machine: &Machine| -> Result<Val, String> {
                    match v {
                        Value::Const(Constant::Int(n)) => Ok(Val::Int(*n)),
                        Value::Const(Constant::Float(x)) => Ok(Val::Float(*x)),
                        Value::Inst(i) => env.get(&i.0).cloned().ok_or_else(|| format!("%{} not computed", i.0)),
                        Value::Param(p) => args.get(*p as usize).cloned().ok_or_else(|| format!("missing arg {p}")),
                        Value::Global(g) => Ok(Val::Str(machine.module.global(*g).text.clone())),
                    }
                };
                let result = match &inst.kind {
                    InstKind::Alloca { .. } => {
                        self.memory.push(Val::Void);
                        Val::Ptr(self.memory.len() - 1)
                    }
                    InstKind::Load { ptr, .. } => match eval(ptr, &env, self)? {
                        Val::Ptr(addr) => self.memory[addr].clone(),
                        other => return Err(format!("load from {other:?}")),
                    },
                    InstKind::Store { value, ptr, .. } => {
                        let value = eval(value, &env, self)?;
                        match eval(ptr, &env, self)? {
                            Val::Ptr(addr) => self.memory[addr] = value,
                            other => return Err(format!("store to {other:?}")),
                        }
                        Val::Void
                    }
                    InstKind::Binary { op, lhs, rhs } => {
                        binary(*op, eval(lhs, &env, self)?, eval(rhs, &env, self)?)?
                    }
                    InstKind::FCmp { pred, lhs, rhs } => {
                        match (eval(lhs, &env, self)?, eval(rhs, &env, self)?) {
                            (Val::Float(a), Val::Float(b)) => Val::Bool(match pred {
                                FloatPredicate::Olt => a < b,
                                FloatPredicate::Ogt => a > b,
                                FloatPredicate::Ole => a <= b,
                            }),
                            (a, b) => return Err(format!("fcmp on {a:?}, {b:?}")),
                        }
                    }
                    InstKind::Call { callee, args: call_args } => {
                        let values = call_args
                            .iter()
                            .map(|a| eval(a, &env, self))
                            .collect::<Result<Vec<_>, _>>()?;
                        self.call(*callee, values)?
                    }
                    InstKind::Phi { incoming } => {
                        let from = prev.ok_or("phi in entry block")?;
                        let (v, _) = incoming
                            .iter()
                            .find(|(_, b)| *b == from)
                            .ok_or("phi has no input for predecessor")?;
                        eval(v, &env, self)?
                    }
                    InstKind::Ret { value } => {
                        return match value {
                            Some(v) => eval(v, &env, self),
                            None => Ok(Val::Void),
                        };
                    }
                    InstKind::Br { target } => {
                        next = Some(*target);
                        break;
                    }
                    InstKind::CondBr { cond, then_block, else_block } => {
                        next = Some(match eval(cond, &env, self)? {
                            Val::Bool(true) => *then_block,
                            Val::Bool(false) => *else_block,
                            other => return Err(format!("branch on {other:?}")),
                        });
                        break;
                    }
                };
                env.insert(inst_id.0, result);
            }
            match next {
                Some(target) => {
                    prev = Some(block);
                    block = target;
                }
                None => return Err(format!("fell off block `{}`", func.block(block).name)),
            }
        }
    }

    fn printf(&mut self, args: &[Val]) -> Result<(), String> {
        let Some(Val::Str(format)) = args.first() else {
            return Err("printf without a format string".to_string());
        };
        let mut rest = args[1..].iter();
        let mut chars = format.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                self.output.push(c);
                continue;
            }
            let mut precision = None;
            if chars.peek() == Some(&'.') {
                chars.next();
                let mut digits = String::new();
                while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    digits.push(*d);
                    chars.next();
                }
                precision = digits.parse::<usize>().ok();
            }
            let arg = match chars.next() {
                Some('%') => {
                    self.output.push('%');
                    continue;
                }
                Some(_) => rest.next().ok_or("too few printf arguments")?,
                None => return Err("dangling % in format".to_string()),
            };
            let text = match arg {
                Val::Int(n) => n.to_string(),
                Val::Float(x) => format!("{:.*}", precision.unwrap_or(6), x),
                Val::Str(s) => s.clone(),
                other => return Err(format!("cannot print {other:?}")),
            };
            self.output.push_str(&text);
        }
        Ok(())
    }
}

fn binary(op: BinaryOp, lhs: Val, rhs: Val) -> Result<Val, String> {
    Ok(match (op, lhs, rhs) {
        (BinaryOp::FAdd, Val::Float(a), Val::Float(b)) => Val::Float(a + b),
        (BinaryOp::FSub, Val::Float(a), Val::Float(b)) => Val::Float(a - b),
        (BinaryOp::FMul, Val::Float(a), Val::Float(b)) => Val::Float(a * b),
        (BinaryOp::SDiv, Val::Int(a), Val::Int(b)) if b != 0 => Val::Int(a / b),
        (op, a, b) => return Err(format!("{} on {a:?}, {b:?}", op.mnemonic())),
    })
}

/// Lower with default options; panics on a hard error.
pub fn lower(root: &Block) -> Lowered {
    lower_program(root, &LowerOptions::default()).expect("lowering aborted")
}

/// Run the entry function and return what it printed.
pub fn run(module: &Module) -> String {
    let mut machine = Machine::new(module);
    machine.run("main").expect("program failed");
    machine.output
}
