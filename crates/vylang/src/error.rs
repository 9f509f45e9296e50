//! The two error tiers: compile-time errors abort the whole run,
//! runtime errors abort only the current top-level statement. Both carry
//! a source line so the CLI/REPL can report where things went wrong.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("[line {line}] compile error: {message}")]
pub struct CompileError {
    pub line: u32,
    pub message: String,
}

impl CompileError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("[line {line}] runtime error: {message}")]
pub struct RuntimeError {
    pub line: u32,
    pub message: String,
}

impl RuntimeError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

/// Unifies the two tiers for callers (the CLI boundary) that need a
/// single error type, plus the bytecode VM's distinct "unsupported
/// opcode" compile failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VylangError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl VylangError {
    pub fn line(&self) -> u32 {
        match self {
            Self::Compile(e) => e.line,
            Self::Runtime(e) => e.line,
        }
    }
}
