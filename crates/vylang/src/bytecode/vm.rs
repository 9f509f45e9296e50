//! A simple stack machine executing a [`Chunk`]. Shares the symbol
//! container with the tree-walker: `DEFINE_GLOBAL`/`GET_GLOBAL` read and
//! write the same `"global"` group, keyed by the same interned ids.

use crate::error::RuntimeError;
use crate::intern::Interner;
use crate::namespace::{Namespaces, GLOBAL};
use crate::tracer::Tracer;
use crate::value::Value;

use super::chunk::{Chunk, Opcode};

pub struct Vm<'a> {
    chunk: &'a Chunk,
    ip: usize,
    stack: Vec<Value>,
    tracer: Option<&'a mut dyn Tracer>,
}

impl<'a> Vm<'a> {
    pub fn new(chunk: &'a Chunk) -> Self {
        Self { chunk, ip: 0, stack: Vec::new(), tracer: None }
    }

    pub fn with_tracer(chunk: &'a Chunk, tracer: &'a mut dyn Tracer) -> Self {
        Self { chunk, ip: 0, stack: Vec::new(), tracer: Some(tracer) }
    }

    fn read_byte(&mut self) -> u8 {
        let b = self.chunk.code[self.ip];
        self.ip += 1;
        b
    }

    fn read_u16(&mut self) -> u16 {
        let hi = self.read_byte() as u16;
        let lo = self.read_byte() as u16;
        (hi << 8) | lo
    }

    fn current_line(&self) -> u32 {
        self.chunk.lines.get(self.ip.saturating_sub(1)).copied().unwrap_or(0) as u32
    }

    fn push(&mut self, v: Value) {
        self.stack.push(v);
    }

    fn pop(&mut self, line: u32) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or_else(|| RuntimeError::new(line, "stack underflow"))
    }

    pub fn run(&mut self, namespaces: &mut Namespaces, interner: &mut Interner) -> Result<Option<Value>, RuntimeError> {
        loop {
            if self.ip >= self.chunk.code.len() {
                return Ok(self.stack.pop());
            }
            let op_byte = self.read_byte();
            let op = decode(op_byte, self.current_line())?;
            let line = self.current_line();
            if let Some(tracer) = self.tracer.as_deref_mut() {
                tracer.on_opcode(self.ip - 1, &op.to_string());
            }
            match op {
                Opcode::Constant => {
                    let idx = self.read_u16() as usize;
                    self.push(self.chunk.constants[idx].clone());
                }
                Opcode::Add | Opcode::Subtract | Opcode::Multiply | Opcode::Divide => {
                    let b = self.pop(line)?;
                    let a = self.pop(line)?;
                    self.push(arith(op, &a, &b, line)?);
                }
                Opcode::Equal => {
                    let b = self.pop(line)?;
                    let a = self.pop(line)?;
                    self.push(Value::boolean(a.value_eq(&b)));
                }
                Opcode::Greater => {
                    let b = self.pop(line)?;
                    let a = self.pop(line)?;
                    self.push(Value::boolean(matches!(a.partial_cmp_value(&b), Some(std::cmp::Ordering::Greater))));
                }
                Opcode::Smaller => {
                    let b = self.pop(line)?;
                    let a = self.pop(line)?;
                    self.push(Value::boolean(matches!(a.partial_cmp_value(&b), Some(std::cmp::Ordering::Less))));
                }
                Opcode::Print => {
                    let v = self.pop(line)?;
                    println!("{}", v.to_display_string());
                    self.push(Value::null());
                }
                Opcode::Type => {
                    let v = self.pop(line)?;
                    self.push(Value::string(v.value_type().to_string()));
                }
                Opcode::Array => {
                    let n = self.read_u16() as usize;
                    let mut elements = Vec::with_capacity(n);
                    for _ in 0..n {
                        elements.push(self.pop(line)?);
                    }
                    elements.reverse();
                    self.push(Value::array(elements));
                }
                Opcode::Pop => {
                    self.pop(line)?;
                }
                Opcode::JumpIfFalse => {
                    let offset = self.read_u16() as usize;
                    let cond = self.stack.last().ok_or_else(|| RuntimeError::new(line, "stack underflow"))?;
                    if !cond.is_truthy() {
                        self.ip += offset;
                    }
                }
                Opcode::Jump => {
                    let offset = self.read_u16() as usize;
                    self.ip += offset;
                }
                Opcode::Loop => {
                    let offset = self.read_u16() as usize;
                    self.ip -= offset;
                }
                Opcode::DefineGlobal => {
                    let idx = self.read_u16() as usize;
                    let name = self.chunk.constants[idx].as_str().expect("global name constant is a string").to_owned();
                    let value = self.pop(line)?;
                    let id = interner.intern(&name);
                    namespaces.define(GLOBAL, id.index() as u32, value.clone());
                    self.push(value);
                }
                Opcode::GetGlobal => {
                    let idx = self.read_u16() as usize;
                    let name = self.chunk.constants[idx].as_str().expect("global name constant is a string").to_owned();
                    let id = interner.intern(&name);
                    let value = namespaces
                        .lookup(GLOBAL, id.index() as u32)
                        .cloned()
                        .ok_or_else(|| RuntimeError::new(line, format!("Variable '{name}' not found")))?;
                    self.push(value);
                }
                Opcode::Return => {
                    return Ok(self.stack.pop());
                }
            }
        }
    }
}

fn decode(byte: u8, line: u32) -> Result<Opcode, RuntimeError> {
    const OPS: [Opcode; 18] = [
        Opcode::Constant,
        Opcode::Add,
        Opcode::Subtract,
        Opcode::Multiply,
        Opcode::Divide,
        Opcode::Equal,
        Opcode::Greater,
        Opcode::Smaller,
        Opcode::Print,
        Opcode::Type,
        Opcode::Array,
        Opcode::Pop,
        Opcode::JumpIfFalse,
        Opcode::Jump,
        Opcode::Loop,
        Opcode::DefineGlobal,
        Opcode::GetGlobal,
        Opcode::Return,
    ];
    OPS.get(byte as usize).copied().ok_or_else(|| RuntimeError::new(line, format!("invalid opcode byte {byte}")))
}

fn arith(op: Opcode, a: &Value, b: &Value, line: u32) -> Result<Value, RuntimeError> {
    let (Some(x), Some(y)) = (a.as_number(), b.as_number()) else {
        return Err(RuntimeError::new(line, "arithmetic requires two numbers"));
    };
    match op {
        Opcode::Add => Ok(Value::number(x + y)),
        Opcode::Subtract => Ok(Value::number(x - y)),
        Opcode::Multiply => Ok(Value::number(x * y)),
        Opcode::Divide => {
            if y == 0.0 {
                Err(RuntimeError::new(line, "division by zero"))
            } else {
                Ok(Value::number(x / y))
            }
        }
        _ => unreachable!("arith called only for the four arithmetic opcodes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstKind, AstNode, BinOp};
    use crate::bytecode::compile;

    #[test]
    fn compiles_and_runs_simple_arithmetic() {
        let prog = vec![AstNode::new(
            AstKind::BinOp {
                op: BinOp::Add,
                left: Box::new(AstNode::new(AstKind::Number(1.0), 1)),
                right: Box::new(AstNode::new(
                    AstKind::BinOp {
                        op: BinOp::Multiply,
                        left: Box::new(AstNode::new(AstKind::Number(2.0), 1)),
                        right: Box::new(AstNode::new(AstKind::Number(3.0), 1)),
                    },
                    1,
                )),
            },
            1,
        )];
        let chunk = compile(&prog).unwrap();
        let mut namespaces = Namespaces::new();
        let mut interner = Interner::new();
        let mut vm = Vm::new(&chunk);
        let result = vm.run(&mut namespaces, &mut interner).unwrap();
        assert_eq!(result.unwrap().as_number(), Some(7.0));
    }

    #[test]
    fn unsupported_node_is_a_compile_error() {
        let prog = vec![AstNode::new(AstKind::Break, 1)];
        assert!(compile(&prog).is_err());
    }
}
