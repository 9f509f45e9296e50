//! The partial bytecode layer: an optional lowering path for a minimal
//! expression/statement subset, plus a stack VM that
//! shares the symbol container and value representation with the
//! tree-walker. Non-normative: whatever it can't lower raises a
//! compile-time "unsupported in bytecode" error rather than guessing at
//! semantics the tree-walker alone defines.

mod chunk;
mod compiler;
mod vm;

pub use chunk::{Chunk, Opcode};
pub use compiler::compile;
pub use vm::Vm;
