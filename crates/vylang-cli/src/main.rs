use std::io::Write as _;
use std::process::ExitCode;
use std::{env, fs, io};

use vylang::bytecode;
use vylang::{Interner, Interpreter, Lexer, Parser, StderrTracer};

enum Mode {
    Ast(String),
    Bytecode(String),
    Repl,
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let mut mode = None;
    let mut trace = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ast" => {
                let Some(path) = args.next() else {
                    eprintln!("--ast requires a file path");
                    return ExitCode::from(2);
                };
                mode = Some(Mode::Ast(path));
            }
            "--bytecode" => {
                let Some(path) = args.next() else {
                    eprintln!("--bytecode requires a file path");
                    return ExitCode::from(2);
                };
                mode = Some(Mode::Bytecode(path));
            }
            "--trace" => trace = true,
            other => {
                eprintln!("unrecognized argument: {other}");
                return ExitCode::from(2);
            }
        }
    }

    match mode.unwrap_or(Mode::Repl) {
        Mode::Ast(path) => run_file(&path, trace),
        Mode::Bytecode(path) => run_bytecode_file(&path, trace),
        Mode::Repl => run_repl(trace),
    }
}

fn read_source(path: &str) -> Result<String, ExitCode> {
    if !path.ends_with(".vy") {
        eprintln!("error: expected a .vy source file, got '{path}'");
        return Err(ExitCode::from(2));
    }
    fs::read_to_string(path).map_err(|err| {
        eprintln!("error reading {path}: {err}");
        ExitCode::from(2)
    })
}

fn run_file(path: &str, trace: bool) -> ExitCode {
    let source = match read_source(path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mut interner = Interner::new();
    let (tokens, warnings) = Lexer::new(&source).tokenize();
    for w in &warnings {
        eprintln!("[line {}] warning: unexpected byte 0x{:02x}", w.line, w.byte);
    }
    let program = match Parser::new(tokens, &mut interner).parse_program() {
        Ok(p) => p,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let mut interp =
        if trace { Interpreter::with_tracer(Box::new(StderrTracer)) } else { Interpreter::new() };
    interp.interner = interner;
    match interp.run_program(&program) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

fn run_bytecode_file(path: &str, trace: bool) -> ExitCode {
    let source = match read_source(path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mut interner = Interner::new();
    let (tokens, warnings) = Lexer::new(&source).tokenize();
    for w in &warnings {
        eprintln!("[line {}] warning: unexpected byte 0x{:02x}", w.line, w.byte);
    }
    let program = match Parser::new(tokens, &mut interner).parse_program() {
        Ok(p) => p,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let chunk = match bytecode::compile(&program) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let mut namespaces = vylang::Namespaces::new();
    let mut stderr_tracer = StderrTracer;
    let mut vm = if trace {
        bytecode::Vm::with_tracer(&chunk, &mut stderr_tracer)
    } else {
        bytecode::Vm::new(&chunk)
    };
    match vm.run(&mut namespaces, &mut interner) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(70)
        }
    }
}

fn run_repl(trace: bool) -> ExitCode {
    let mut interp =
        if trace { Interpreter::with_tracer(Box::new(StderrTracer)) } else { Interpreter::new() };

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("vy> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) => return ExitCode::SUCCESS,
            Ok(_) => {}
            Err(err) => {
                eprintln!("error reading stdin: {err}");
                return ExitCode::from(1);
            }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" {
            return ExitCode::SUCCESS;
        }
        if trimmed == "view tree" {
            for group in interp.namespaces.groups() {
                println!("{group}:");
                for (id, value) in interp.namespaces.iterate(group) {
                    println!("  {} = {}", interp.interner.get(vylang::StringId::from_index(id)), value.to_display_string());
                }
            }
            continue;
        }

        let (tokens, warnings) = Lexer::new(trimmed).tokenize();
        for w in &warnings {
            eprintln!("[line {}] warning: unexpected byte 0x{:02x}", w.line, w.byte);
        }
        let program = match Parser::new(tokens, &mut interp.interner).parse_program() {
            Ok(p) => p,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        match interp.run_program(&program) {
            Ok(Some(v)) => println!("{}", v.to_display_string()),
            Ok(None) => {}
            Err(err) => eprintln!("{err}"),
        }
    }
}
