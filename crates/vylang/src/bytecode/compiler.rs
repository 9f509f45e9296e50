//! Lowers a restricted expression/statement subset into a [`Chunk`].
//! Anything outside that subset — function calls, groups,
//! modules, arrays methods, `through`, scoped variables — raises a
//! compile-time "unsupported in bytecode" error; the tree-walker remains
//! the only path that handles the full language.

use crate::ast::{AstKind, AstNode, BinOp};
use crate::error::CompileError;
use crate::value::Value;

use super::chunk::{Chunk, Opcode};

pub fn compile(statements: &[AstNode]) -> Result<Chunk, CompileError> {
    let mut chunk = Chunk::new();
    for (i, stmt) in statements.iter().enumerate() {
        compile_statement(&mut chunk, stmt)?;
        if i + 1 < statements.len() {
            chunk.write_op(Opcode::Pop, stmt.line);
        }
    }
    chunk.write_op(Opcode::Return, statements.last().map_or(0, |s| s.line));
    Ok(chunk)
}

fn unsupported(line: u32, what: &str) -> CompileError {
    CompileError::new(line, format!("unsupported in bytecode: {what}"))
}

fn compile_statement(chunk: &mut Chunk, node: &AstNode) -> Result<(), CompileError> {
    match &node.kind {
        AstKind::Assignment { original_name, rhs, index: None, scope_path: None, is_const: false, .. } => {
            compile_expr(chunk, rhs)?;
            let const_idx = chunk.add_constant(Value::string(original_name.clone()));
            chunk.write_op(Opcode::DefineGlobal, node.line);
            chunk.write_u16(const_idx, node.line);
            Ok(())
        }
        AstKind::If { cond, then_branch, else_branch } => {
            compile_expr(chunk, cond)?;
            let then_jump = chunk.emit_jump(Opcode::JumpIfFalse, node.line);
            chunk.write_op(Opcode::Pop, node.line);
            compile_statement(chunk, then_branch)?;
            let else_jump = chunk.emit_jump(Opcode::Jump, node.line);
            chunk.patch_jump(then_jump);
            chunk.write_op(Opcode::Pop, node.line);
            if let Some(else_branch) = else_branch {
                compile_statement(chunk, else_branch)?;
            }
            chunk.patch_jump(else_jump);
            Ok(())
        }
        AstKind::While { cond, body } => {
            let loop_start = chunk.code.len();
            compile_expr(chunk, cond)?;
            let exit_jump = chunk.emit_jump(Opcode::JumpIfFalse, node.line);
            chunk.write_op(Opcode::Pop, node.line);
            compile_statement(chunk, body)?;
            chunk.emit_loop(loop_start, node.line);
            chunk.patch_jump(exit_jump);
            chunk.write_op(Opcode::Pop, node.line);
            Ok(())
        }
        AstKind::Block(stmts) => {
            for (i, s) in stmts.iter().enumerate() {
                compile_statement(chunk, s)?;
                if i + 1 < stmts.len() {
                    chunk.write_op(Opcode::Pop, s.line);
                }
            }
            Ok(())
        }
        AstKind::BuiltInCall { name, args } if name == "log" => {
            let arg = args.first().ok_or_else(|| unsupported(node.line, "log with no arguments"))?;
            compile_expr(chunk, arg)?;
            chunk.write_op(Opcode::Print, node.line);
            Ok(())
        }
        _ => compile_expr(chunk, node),
    }
}

fn compile_expr(chunk: &mut Chunk, node: &AstNode) -> Result<(), CompileError> {
    match &node.kind {
        AstKind::Number(n) => emit_constant(chunk, Value::number(*n), node.line),
        AstKind::Boolean(b) => emit_constant(chunk, Value::boolean(*b), node.line),
        AstKind::StringLit(s) => emit_constant(chunk, Value::string(s.as_ref()), node.line),
        AstKind::Null => emit_constant(chunk, Value::null(), node.line),
        AstKind::Array(elements) => {
            for e in elements {
                compile_expr(chunk, e)?;
            }
            chunk.write_op(Opcode::Array, node.line);
            chunk.write_u16(elements.len() as u16, node.line);
            Ok(())
        }
        AstKind::Variable { original_name, scope_path: None, .. } => {
            let const_idx = chunk.add_constant(Value::string(original_name.clone()));
            chunk.write_op(Opcode::GetGlobal, node.line);
            chunk.write_u16(const_idx, node.line);
            Ok(())
        }
        AstKind::BuiltInCall { name, args } if name == "type" => {
            let arg = args.first().ok_or_else(|| unsupported(node.line, "type with no arguments"))?;
            compile_expr(chunk, arg)?;
            chunk.write_op(Opcode::Type, node.line);
            Ok(())
        }
        AstKind::BinOp { op, left, right } => {
            compile_expr(chunk, left)?;
            compile_expr(chunk, right)?;
            let op = match op {
                BinOp::Add => Opcode::Add,
                BinOp::Subtract => Opcode::Subtract,
                BinOp::Multiply => Opcode::Multiply,
                BinOp::Divide => Opcode::Divide,
                BinOp::Equal => Opcode::Equal,
                BinOp::Greater => Opcode::Greater,
                BinOp::Less => Opcode::Smaller,
                other => return Err(unsupported(node.line, &format!("operator '{other}'"))),
            };
            chunk.write_op(op, node.line);
            Ok(())
        }
        other => Err(unsupported(node.line, &format!("{other:?}"))),
    }
}

fn emit_constant(chunk: &mut Chunk, value: Value, line: u32) -> Result<(), CompileError> {
    let idx = chunk.add_constant(value);
    chunk.write_op(Opcode::Constant, line);
    chunk.write_u16(idx, line);
    Ok(())
}
