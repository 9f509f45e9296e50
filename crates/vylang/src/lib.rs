//! vylang: a small dynamically-typed scripting language, implemented as
//! a tree-walking interpreter with an optional restricted bytecode path
//! sharing the same value representation and symbol container.
//!
//! The pipeline: [`lexer::Lexer`] produces a token stream (never aborting
//! on its own — bad bytes become [`lexer::LexWarning`]s), [`parser::Parser`]
//! turns that into an [`ast::AstNode`] program, and [`eval::Interpreter`]
//! walks it directly. [`bytecode`] offers a second, narrower path for
//! programs that stay inside its supported subset.

pub mod ast;
pub mod bytecode;
pub mod error;
pub mod eval;
pub mod intern;
pub mod lexer;
pub mod modules;
pub mod namespace;
pub mod parser;
pub mod tracer;
pub mod value;

pub use ast::AstNode;
pub use error::{CompileError, RuntimeError, VylangError};
pub use eval::Interpreter;
pub use intern::{Interner, StringId};
pub use lexer::{LexWarning, Lexer, Token, TokenKind};
pub use namespace::Namespaces;
pub use parser::Parser;
pub use tracer::{NoopTracer, StderrTracer, Tracer};
pub use value::{FunctionData, NativeCtx, NativeFn, Type, Value};

/// Lexes and parses `source` into a program, using a fresh [`Interner`].
/// Convenience wrapper around [`Lexer`]/[`Parser`] for callers that don't
/// need to keep lex warnings or reuse an interner across runs.
pub fn parse(source: &str) -> Result<(Vec<AstNode>, Interner), CompileError> {
    let mut interner = Interner::new();
    let (tokens, _warnings) = Lexer::new(source).tokenize();
    let program = Parser::new(tokens, &mut interner).parse_program()?;
    Ok((program, interner))
}

/// Parses and runs `source` end to end with a fresh [`Interpreter`],
/// returning the value of the last top-level statement.
pub fn run(source: &str) -> Result<Option<Value>, VylangError> {
    let (program, interner) = parse(source).map_err(VylangError::from)?;
    let mut interp = Interpreter::new();
    interp.interner = interner;
    interp.run_program(&program).map_err(VylangError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_evaluates_last_statement() {
        let v = run("1 + 1; 2 + 2;").unwrap().unwrap();
        assert_eq!(v.as_number(), Some(4.0));
    }

    #[test]
    fn parse_surfaces_lexer_driven_compile_errors() {
        let err = parse("sub f(n ;").unwrap_err();
        assert!(err.line >= 1);
    }
}
