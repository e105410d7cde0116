// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Ember CLI - lowers serialized programs to IR and object code.

mod output;

use std::env;
use std::fs;
use std::process;

use ember_ast::Block;
use ember_diagnostics::convert::lower_error_in_module;
use ember_diagnostics::formatter::DiagnosticFormatter;
use ember_diagnostics::json::{to_json_report, to_json_string};
use ember_diagnostics::{Diagnostic, ToDiagnostic};
use ember_lower::{ErrorPolicy, LowerOptions, Lowered};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Flags shared by every command.
#[derive(Debug, Default)]
struct Flags {
    input: Option<String>,
    output: Option<String>,
    fail_fast: bool,
    json: bool,
    module_name: Option<String>,
}

fn main() {
    output::init();
    init_logging();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    match command {
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        "version" | "--version" | "-V" => {
            println!("ember {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {}
    }

    let flags = match parse_flags(&args[2..]) {
        Ok(flags) => flags,
        Err(msg) => {
            eprintln!("{}: {}", output::error_label(), msg);
            process::exit(1);
        }
    };

    match command {
        "lower" => cmd_lower(&flags),
        "check" => cmd_check(&flags),
        "build" => cmd_build(&flags),
        other => {
            eprintln!("{}: unknown command `{}`", output::error_label(), other);
            print_usage();
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("EMBER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn print_usage() {
    println!("Ember {} - AST to IR lowering", env!("CARGO_PKG_VERSION"));
    println!();
    println!("{} ember <command> <program.json> [options]", output::section_header("Usage:"));
    println!();
    println!("{}", output::section_header("Commands:"));
    println!("  {}     Lower a program and print the IR", output::command_name("lower"));
    println!("  {}     Lower and verify, reporting every problem", output::command_name("check"));
    println!("  {}     Lower, verify and write a native object file", output::command_name("build"));
    println!("  {}      Show this help", output::command_name("help"));
    println!("  {}   Show version", output::command_name("version"));
    println!();
    println!("{}", output::section_header("Options:"));
    println!("  -o <path>             Write output to <path> (required for build)");
    println!("  --fail-fast           Stop at the first lowering error");
    println!("  --module-name <name>  Name of the emitted module (default: main)");
    println!("  --json                Print diagnostics as JSON (check only)");
    println!();
    println!("Set EMBER_LOG (e.g. EMBER_LOG=debug) to trace the lowering.");
}

fn parse_flags(args: &[String]) -> Result<Flags, String> {
    let mut flags = Flags::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                let path = iter.next().ok_or_else(|| format!("`{}` needs a path", arg))?;
                flags.output = Some(path.clone());
            }
            "--module-name" => {
                let name = iter.next().ok_or("`--module-name` needs a name")?;
                flags.module_name = Some(name.clone());
            }
            "--fail-fast" => flags.fail_fast = true,
            "--json" => flags.json = true,
            other if other.starts_with('-') => return Err(format!("unknown option `{}`", other)),
            other => {
                if flags.input.is_some() {
                    return Err(format!("unexpected argument `{}`", other));
                }
                flags.input = Some(other.to_string());
            }
        }
    }
    Ok(flags)
}

fn input_path(flags: &Flags) -> &str {
    match flags.input.as_deref() {
        Some(path) => path,
        None => {
            eprintln!("{}: missing <program.json>", output::error_label());
            process::exit(1);
        }
    }
}

fn read_program(path: &str) -> Block {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: reading {}: {}", output::error_label(), output::file_path(path), e);
            process::exit(1);
        }
    };
    match serde_json::from_str(&source) {
        Ok(block) => block,
        Err(e) => {
            eprintln!("{}: {} is not a valid program: {}", output::error_label(), output::file_path(path), e);
            process::exit(1);
        }
    }
}

fn options_for(flags: &Flags) -> LowerOptions {
    let mut options = LowerOptions::default();
    if flags.fail_fast {
        options = options.with_policy(ErrorPolicy::FailFast);
    }
    if let Some(name) = &flags.module_name {
        options.module_name = name.clone();
    }
    options
}

/// Lower the input, exiting on an aborted lowering. Recorded errors are
/// returned as diagnostics alongside the module.
fn lower_input(path: &str, flags: &Flags) -> (Lowered, Vec<Diagnostic>) {
    let root = read_program(path);
    debug!(path, statements = root.stmts.len(), "lowering program");
    match ember_lower::lower_program(&root, &options_for(flags)) {
        Ok(lowered) => {
            let diags = lowered
                .errors
                .iter()
                .map(|e| lower_error_in_module(e, &lowered.module))
                .collect();
            (lowered, diags)
        }
        Err(e) => {
            report(path, &[e.to_diagnostic()]);
            process::exit(1);
        }
    }
}

fn report(path: &str, diags: &[Diagnostic]) {
    if diags.is_empty() {
        return;
    }
    let formatter = DiagnosticFormatter::new().with_file_name(path);
    eprint!("{}", formatter.format_all(diags));
}

fn error_count(diags: &[Diagnostic]) -> usize {
    diags.iter().filter(|d| d.is_error()).count()
}

fn cmd_lower(flags: &Flags) {
    let path = input_path(flags);
    let (lowered, diags) = lower_input(path, flags);
    let text = lowered.module.to_string();

    match &flags.output {
        Some(out) => {
            if let Err(e) = fs::write(out, &text) {
                eprintln!("{}: writing {}: {}", output::error_label(), output::file_path(out), e);
                process::exit(1);
            }
        }
        None => print!("{}", text),
    }

    report(path, &diags);
    if error_count(&diags) > 0 {
        process::exit(1);
    }
}

fn cmd_check(flags: &Flags) {
    let path = input_path(flags);
    let (lowered, mut diags) = lower_input(path, flags);
    diags.extend(ember_ir::verify(&lowered.module).iter().map(|e| e.to_diagnostic()));
    let errors = error_count(&diags);

    if flags.json {
        println!("{}", to_json_string(&to_json_report(&diags, path, "check")));
    } else {
        report(path, &diags);
        if errors == 0 {
            println!("{}", output::banner_ok("Check"));
        } else {
            println!("{}", output::banner_fail("Check", errors));
        }
    }

    if errors > 0 {
        process::exit(1);
    }
}

fn cmd_build(flags: &Flags) {
    let path = input_path(flags);
    let Some(out) = flags.output.as_deref() else {
        eprintln!("{}: build needs an output path: -o <out.o>", output::error_label());
        process::exit(1);
    };

    let (lowered, mut diags) = lower_input(path, flags);
    if error_count(&diags) == 0 {
        diags.extend(ember_ir::verify(&lowered.module).iter().map(|e| e.to_diagnostic()));
    }
    let errors = error_count(&diags);
    if errors > 0 {
        report(path, &diags);
        println!("{}", output::banner_fail("Build", errors));
        process::exit(1);
    }

    let result = ember_codegen::compile(&lowered.module)
        .and_then(|bytes| fs::write(out, bytes).map_err(Into::into));
    if let Err(e) = result {
        report(path, &[e.to_diagnostic()]);
        println!("{}", output::banner_fail("Build", 1));
        process::exit(1);
    }

    println!("{} {}", output::banner_ok("Build"), output::file_path(out));
}
