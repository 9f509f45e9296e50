//! The tree-walking evaluator: the normative execution
//! path. `evaluate` is the single dispatching driver over `AstKind`;
//! every call site returns a [`Signal`] rather than throwing, so
//! `return`/`break`/`continue` are ordinary data flowing up through
//! `?` until a loop or call frame consumes them.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::ast::{AstKind, AstNode, BinOp, PostfixOp};
use crate::error::RuntimeError;
use crate::intern::{Interner, StringId};
use crate::lexer::LoopMode;
use crate::namespace::{Namespaces, GLOBAL};
use crate::tracer::{NoopTracer, Tracer};
use crate::value::{FunctionData, NativeCtx, Value};

/// What evaluating a node actually produced: a plain value, or a
/// non-local jump in progress. Loops consume `Break`/`Continue`; calls
/// consume `Return`; anything else escaping to the top level is a
/// runtime error.
pub enum Signal {
    Value(Value),
    Return(Value),
    Break,
    Continue,
}

impl Signal {
    fn into_value(self, line: u32) -> Result<Value, RuntimeError> {
        match self {
            Signal::Value(v) | Signal::Return(v) => Ok(v),
            Signal::Break => Err(RuntimeError::new(line, "break outside loop")),
            Signal::Continue => Err(RuntimeError::new(line, "continue outside loop")),
        }
    }
}

pub struct Interpreter {
    pub interner: Interner,
    pub namespaces: Namespaces,
    pub tracer: Box<dyn Tracer>,
    call_nonce: u32,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            namespaces: Namespaces::new(),
            tracer: Box::new(NoopTracer),
            call_nonce: 0,
        }
    }

    pub fn with_tracer(tracer: Box<dyn Tracer>) -> Self {
        Self { tracer, ..Self::new() }
    }

    /// Runs a whole top-level program, stopping at the first runtime
    /// error: a runtime error aborts the current top-level statement,
    /// and in file-mode execution that means the run stops.
    pub fn run_program(&mut self, statements: &[AstNode]) -> Result<Option<Value>, RuntimeError> {
        let mut last = None;
        for stmt in statements {
            last = Some(self.run_top_level(stmt)?);
        }
        Ok(last)
    }

    pub fn run_top_level(&mut self, stmt: &AstNode) -> Result<Value, RuntimeError> {
        self.tracer.on_statement(stmt.line, GLOBAL);
        let signal = self.evaluate(stmt, GLOBAL)?;
        signal.into_value(stmt.line)
    }

    fn eval_value(&mut self, node: &AstNode, group: &str) -> Result<Value, RuntimeError> {
        let signal = self.evaluate(node, group)?;
        signal.into_value(node.line)
    }

    /// Resolves a node's scope path into the concrete group key it names:
    /// the explicit `"global.a.b.c"` path when one was given, or whatever
    /// group is current when it wasn't.
    fn group_path(&self, current_group: &str, scope_path: Option<&[String]>) -> String {
        match scope_path {
            Some(segments) if segments.first().map(String::as_str) == Some(GLOBAL) => segments.join("."),
            Some(segments) => format!("{GLOBAL}.{}", segments.join(".")),
            None => current_group.to_owned(),
        }
    }

    pub fn evaluate(&mut self, node: &AstNode, current_group: &str) -> Result<Signal, RuntimeError> {
        match &node.kind {
            AstKind::Program(stmts) | AstKind::Block(stmts) => {
                let mut last = Value::null();
                for stmt in stmts {
                    match self.evaluate(stmt, current_group)? {
                        Signal::Value(v) => last = v,
                        other => return Ok(other),
                    }
                }
                Ok(Signal::Value(last))
            }
            AstKind::Group { name, body } => {
                let group_name = self.interner.get(*name).to_owned();
                let child_group = format!("{current_group}.{group_name}");
                self.namespaces.ensure_group(&child_group);
                for stmt in body {
                    self.evaluate(stmt, &child_group)?;
                }
                Ok(Signal::Value(Value::null()))
            }
            AstKind::Number(n) => Ok(Signal::Value(Value::number(*n))),
            AstKind::StringLit(s) => Ok(Signal::Value(Value::string(Rc::clone(s)))),
            AstKind::Boolean(b) => Ok(Signal::Value(Value::boolean(*b))),
            AstKind::Null => Ok(Signal::Value(Value::null())),
            AstKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for e in elements {
                    values.push(self.eval_value(e, current_group)?);
                }
                Ok(Signal::Value(Value::array(values)))
            }
            AstKind::Range { start, end } => {
                let start = self.eval_value(start, current_group)?;
                let end = self.eval_value(end, current_group)?;
                Ok(Signal::Value(Value::array(materialize_range(&start, &end, node.line)?)))
            }
            AstKind::Variable { id, original_name, scope_path } => {
                let target = self.group_path(current_group, scope_path.as_deref());
                let v = self
                    .namespaces
                    .resolve_lookup(current_group, Some(target.as_str()), id.index() as u32, original_name, node.line)?
                    .clone();
                Ok(Signal::Value(v))
            }
            AstKind::IndexAccess { id, original_name, scope_path, index } => {
                let target = self.group_path(current_group, scope_path.as_deref());
                let base = self
                    .namespaces
                    .resolve_lookup(current_group, Some(target.as_str()), id.index() as u32, original_name, node.line)?
                    .clone();
                let idx_val = self.eval_value(index, current_group)?;
                let array = base.as_array().ok_or_else(|| RuntimeError::new(node.line, format!("'{original_name}' is not an array")))?;
                let idx = array_index(&idx_val, array.borrow().len(), node.line)?;
                Ok(Signal::Value(array.borrow()[idx].clone()))
            }
            AstKind::Assignment { id, original_name, rhs, index, scope_path, is_const } => {
                let value = self.eval_value(rhs, current_group)?;
                let explicit_group = scope_path.as_deref().map(|segs| self.group_path(current_group, Some(segs)));
                let target_group = self
                    .namespaces
                    .resolve_assignment_group(current_group, explicit_group.as_deref(), id.index() as u32, original_name, node.line)?
                    .to_owned();

                if let Some(index_expr) = index {
                    let existing = self
                        .namespaces
                        .lookup(&target_group, id.index() as u32)
                        .cloned()
                        .ok_or_else(|| RuntimeError::new(node.line, format!("Variable '{original_name}' not found")))?;
                    if existing.is_read_only() {
                        return Err(RuntimeError::new(node.line, format!("Cannot reassign read-only '{original_name}'")));
                    }
                    let idx_val = self.eval_value(index_expr, current_group)?;
                    let array = existing
                        .as_array()
                        .ok_or_else(|| RuntimeError::new(node.line, format!("'{original_name}' is not an array")))?;
                    let idx = array_index(&idx_val, array.borrow().len(), node.line)?;
                    array.borrow_mut()[idx] = value.clone();
                    return Ok(Signal::Value(value));
                }

                if let Some(existing) = self.namespaces.lookup(&target_group, id.index() as u32) {
                    if existing.is_read_only() {
                        return Err(RuntimeError::new(node.line, format!("Cannot reassign read-only '{original_name}'")));
                    }
                }
                let stored = value.clone().with_read_only(*is_const);
                self.namespaces.define(&target_group, id.index() as u32, stored);
                Ok(Signal::Value(value))
            }
            AstKind::BinOp { op, left, right } => self.eval_binop(*op, left, right, current_group, node.line),
            AstKind::Postfix { op, target } => self.eval_postfix(*op, target, current_group, node.line),
            AstKind::BuiltInCall { name, args } => self.eval_builtin(name, args, current_group, node.line),
            AstKind::FunctionDef { target_module, id, name, param_ids, body } => {
                let dest_group = match target_module {
                    Some(m) => format!("{GLOBAL}.{}", self.interner.get(*m)),
                    None => current_group.to_owned(),
                };
                self.namespaces.ensure_group(&dest_group);
                let func = Value::function(FunctionData {
                    param_ids: param_ids.clone(),
                    body: Rc::clone(body),
                    native_fn: None,
                    is_native: false,
                    name: name.clone(),
                });
                self.namespaces.define(&dest_group, id.index() as u32, func);
                Ok(Signal::Value(Value::null()))
            }
            AstKind::FunctionCall { id, name, args } => {
                let func = self
                    .namespaces
                    .lookup(GLOBAL, id.index() as u32)
                    .cloned()
                    .ok_or_else(|| RuntimeError::new(node.line, format!("Function '{name}' not found")))?;
                let mut arg_values = Vec::with_capacity(args.len());
                for a in args {
                    arg_values.push(self.eval_value(a, current_group)?);
                }
                self.call_function(&func, name, arg_values, node.line)
            }
            AstKind::MethodCall { receiver, name, args } => self.eval_method_call(receiver, name, args, current_group, node.line),
            AstKind::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval_value(e, current_group)?,
                    None => Value::null(),
                };
                Ok(Signal::Return(value))
            }
            AstKind::While { cond, body } => {
                let mut last = Value::null();
                loop {
                    if !self.eval_value(cond, current_group)?.is_truthy() {
                        break;
                    }
                    match self.evaluate(body, current_group)? {
                        Signal::Value(v) => last = v,
                        Signal::Break => break,
                        Signal::Continue => continue,
                        ret @ Signal::Return(_) => return Ok(ret),
                    }
                }
                Ok(Signal::Value(last))
            }
            AstKind::For { iterable, body, iterator_name, mode } => {
                self.eval_for(iterable, body, *iterator_name, *mode, current_group, node.line)
            }
            AstKind::If { cond, then_branch, else_branch } => {
                if self.eval_value(cond, current_group)?.is_truthy() {
                    self.evaluate(then_branch, current_group)
                } else if let Some(else_branch) = else_branch {
                    self.evaluate(else_branch, current_group)
                } else {
                    Ok(Signal::Value(Value::null()))
                }
            }
            AstKind::Module { id, name } => {
                self.register_module(name, node.line)?;
                self.namespaces.define(GLOBAL, id.index() as u32, Value::module(*id, name.clone()));
                Ok(Signal::Value(Value::null()))
            }
            AstKind::Dismiss { name, .. } => {
                let group = format!("{GLOBAL}.{name}");
                if !self.namespaces.group_exists(&group) {
                    return Err(RuntimeError::new(node.line, format!("Module '{name}' not found")));
                }
                self.namespaces.drop_group(&group);
                Ok(Signal::Value(Value::null()))
            }
            AstKind::Break => Ok(Signal::Break),
            AstKind::Continue => Ok(Signal::Continue),
        }
    }

    fn eval_binop(&mut self, op: BinOp, left: &AstNode, right: &AstNode, group: &str, line: u32) -> Result<Signal, RuntimeError> {
        if op == BinOp::And {
            let l = self.eval_value(left, group)?;
            if !l.is_truthy() {
                return Ok(Signal::Value(Value::boolean(false)));
            }
            let r = self.eval_value(right, group)?;
            return Ok(Signal::Value(Value::boolean(r.is_truthy())));
        }
        if op == BinOp::Or {
            let l = self.eval_value(left, group)?;
            if l.is_truthy() {
                return Ok(Signal::Value(Value::boolean(true)));
            }
            let r = self.eval_value(right, group)?;
            return Ok(Signal::Value(Value::boolean(r.is_truthy())));
        }

        let l = self.eval_value(left, group)?;
        let r = self.eval_value(right, group)?;
        apply_binop(op, &l, &r, line).map(Signal::Value)
    }

    fn eval_postfix(&mut self, op: PostfixOp, target: &AstNode, group: &str, line: u32) -> Result<Signal, RuntimeError> {
        let AstKind::Variable { id, original_name, scope_path } = &target.kind else {
            return Err(RuntimeError::new(line, "'++'/'--' require a variable reference"));
        };
        let target_group = self.group_path(group, scope_path.as_deref());
        let current = self
            .namespaces
            .resolve_lookup(group, Some(target_group.as_str()), id.index() as u32, original_name, line)?
            .clone();
        let n = current.as_number().ok_or_else(|| RuntimeError::new(line, format!("'{original_name}' is not a number")))?;
        if current.is_read_only() {
            return Err(RuntimeError::new(line, format!("Cannot reassign read-only '{original_name}'")));
        }
        let delta = if op == PostfixOp::Increment { 1.0 } else { -1.0 };
        let updated = Value::number(n + delta);
        self.namespaces.define(&target_group, id.index() as u32, updated.clone());
        Ok(Signal::Value(updated))
    }

    fn call_function(&mut self, func: &Value, name: &str, mut args: Vec<Value>, line: u32) -> Result<Signal, RuntimeError> {
        let f = func.as_function().ok_or_else(|| RuntimeError::new(line, format!("'{name}' is not a function")))?;
        if f.is_native {
            let native_fn = f.native_fn.clone().expect("native function has native_fn");
            let ctx = NativeCtx { interner: &self.interner, namespaces: &self.namespaces };
            let result = native_fn(&mut args, &ctx).map_err(|mut e| {
                e.line = line;
                e
            })?;
            return Ok(Signal::Value(result));
        }
        if f.param_ids.len() != args.len() {
            return Err(RuntimeError::new(line, format!("'{name}' expects {} argument(s), got {}", f.param_ids.len(), args.len())));
        }
        self.call_nonce += 1;
        let frame = format!("call_{name}_{}", self.call_nonce);
        self.namespaces.ensure_group(&frame);
        for (param_id, value) in f.param_ids.iter().zip(args) {
            self.namespaces.define(&frame, *param_id, value);
        }
        self.tracer.on_call(name, &frame, self.call_nonce as usize);
        let body = Rc::clone(&f.body);
        let result = (|| {
            let mut last = Value::null();
            for stmt in body.iter() {
                match self.evaluate(stmt, &frame)? {
                    Signal::Value(v) => last = v,
                    Signal::Return(v) => return Ok(v),
                    Signal::Break => return Err(RuntimeError::new(stmt.line, "break outside loop")),
                    Signal::Continue => return Err(RuntimeError::new(stmt.line, "continue outside loop")),
                }
            }
            Ok(last)
        })();
        self.namespaces.drop_group(&frame);
        self.tracer.on_return(name, self.call_nonce as usize);
        result.map(Signal::Value)
    }

    fn eval_method_call(&mut self, receiver: &AstNode, name: &str, args: &[AstNode], group: &str, line: u32) -> Result<Signal, RuntimeError> {
        let receiver_value = self.eval_value(receiver, group)?;

        if let Some(module) = receiver_value.as_module() {
            let module_group = format!("{GLOBAL}.{}", module.name);
            let method_id = self.interner.intern(name);
            let func = self
                .namespaces
                .lookup(&module_group, method_id.index() as u32)
                .cloned()
                .ok_or_else(|| RuntimeError::new(line, format!("Module '{}' has no method '{name}'", module.name)))?;
            let mut arg_values = Vec::with_capacity(args.len());
            for a in args {
                arg_values.push(self.eval_value(a, group)?);
            }
            return self.call_function(&func, name, arg_values, line);
        }

        if let Some(array) = receiver_value.as_array() {
            let is_named_binding = matches!(receiver.kind, AstKind::Variable { .. });
            return self.eval_array_method(array, name, args, group, is_named_binding, line);
        }

        Err(RuntimeError::new(line, format!("cannot call method '{name}' on a {}", receiver_value.value_type())))
    }

    fn eval_array_method(
        &mut self,
        array: &Rc<std::cell::RefCell<Vec<Value>>>,
        name: &str,
        args: &[AstNode],
        group: &str,
        is_named_binding: bool,
        line: u32,
    ) -> Result<Signal, RuntimeError> {
        if name != "size" && !is_named_binding {
            return Err(RuntimeError::new(line, "mutating methods are not permitted on anonymous arrays"));
        }
        let mut arg_values = Vec::with_capacity(args.len());
        for a in args {
            arg_values.push(self.eval_value(a, group)?);
        }
        let array = Rc::clone(array);
        match name {
            "size" if arg_values.is_empty() => Ok(Signal::Value(Value::number(array.borrow().len() as f64))),
            "push" if !arg_values.is_empty() => {
                array.borrow_mut().extend(arg_values);
                Ok(Signal::Value(Value::array_handle(&array)))
            }
            "pop" if arg_values.is_empty() => {
                let popped = array.borrow_mut().pop();
                if popped.is_none() {
                    return Err(RuntimeError::new(line, "cannot pop from an empty array"));
                }
                Ok(Signal::Value(Value::boolean(true)))
            }
            "delete" if arg_values.len() == 1 => {
                let mut borrowed = array.borrow_mut();
                let pos = borrowed.iter().position(|v| v.value_eq(&arg_values[0]));
                match pos {
                    Some(i) => {
                        borrowed.remove(i);
                        Ok(Signal::Value(Value::boolean(true)))
                    }
                    None => Err(RuntimeError::new(line, "element not found for delete")),
                }
            }
            "sort" if arg_values.is_empty() => {
                let mut borrowed = array.borrow_mut();
                for v in borrowed.iter() {
                    if v.as_number().is_none() {
                        return Err(RuntimeError::new(line, "sort requires all elements to be numbers"));
                    }
                }
                borrowed.sort_by(|a, b| a.partial_cmp_value(b).unwrap_or(Ordering::Equal));
                drop(borrowed);
                Ok(Signal::Value(Value::array_handle(&array)))
            }
            "reverse" if arg_values.is_empty() => {
                array.borrow_mut().reverse();
                Ok(Signal::Value(Value::array_handle(&array)))
            }
            "clear" if arg_values.is_empty() => {
                array.borrow_mut().clear();
                Ok(Signal::Value(Value::array_handle(&array)))
            }
            "place_all" if arg_values.len() == 2 => {
                let count = arg_values[0].as_number().ok_or_else(|| RuntimeError::new(line, "place_all expects a number count"))?;
                let elem = arg_values[1].clone();
                *array.borrow_mut() = std::iter::repeat(elem).take(count.max(0.0) as usize).collect();
                Ok(Signal::Value(Value::array_handle(&array)))
            }
            "size" | "push" | "pop" | "delete" | "sort" | "reverse" | "clear" | "place_all" => {
                Err(RuntimeError::new(line, format!("wrong argument count for '{name}'")))
            }
            other => Err(RuntimeError::new(line, format!("unknown array method '{other}'"))),
        }
    }

    fn eval_for(
        &mut self,
        iterable: &AstNode,
        body: &AstNode,
        iterator_name: StringId,
        mode: LoopMode,
        group: &str,
        line: u32,
    ) -> Result<Signal, RuntimeError> {
        let iterable_value = self.eval_value(iterable, group)?;
        let elements = iterable_value
            .as_array()
            .map(|a| a.borrow().clone())
            .ok_or_else(|| RuntimeError::new(line, "through requires an array (or range) to iterate"))?;

        let iter_id = iterator_name.index() as u32;
        let previous = self.namespaces.lookup(group, iter_id).cloned();

        let mut collected = Vec::new();
        let mut last = Value::null();
        for element in elements {
            self.namespaces.define(group, iter_id, element.clone());
            match self.evaluate(body, group)? {
                Signal::Value(v) => {
                    last = v.clone();
                    match mode {
                        LoopMode::Collect => collected.push(v),
                        LoopMode::Filter => {
                            if v.is_truthy() {
                                collected.push(element);
                            }
                        }
                        LoopMode::Loop | LoopMode::Every | LoopMode::Unique => {}
                    }
                }
                Signal::Break => break,
                Signal::Continue => continue,
                ret @ Signal::Return(_) => {
                    self.restore_iterator(group, iter_id, previous);
                    return Ok(ret);
                }
            }
        }
        self.restore_iterator(group, iter_id, previous);

        let result = match mode {
            LoopMode::Collect | LoopMode::Filter => Value::array(collected),
            LoopMode::Loop | LoopMode::Every | LoopMode::Unique => last,
        };
        Ok(Signal::Value(result))
    }

    fn restore_iterator(&mut self, group: &str, iter_id: u32, previous: Option<Value>) {
        match previous {
            Some(v) => self.namespaces.define(group, iter_id, v),
            None => self.namespaces.erase(group, iter_id),
        }
    }

    fn eval_builtin(&mut self, name: &str, args: &[AstNode], group: &str, line: u32) -> Result<Signal, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval_value(a, group)?);
        }
        match name {
            "log" => {
                let v = values.first().ok_or_else(|| RuntimeError::new(line, "log expects 1 argument"))?;
                println!("{}", v.to_display_string());
                Ok(Signal::Value(Value::null()))
            }
            "type" => {
                let v = values.first().ok_or_else(|| RuntimeError::new(line, "type expects 1 argument"))?;
                Ok(Signal::Value(Value::string(v.value_type().to_string())))
            }
            "string" => {
                let n = values
                    .first()
                    .and_then(Value::as_number)
                    .ok_or_else(|| RuntimeError::new(line, "string expects 1 number argument"))?;
                Ok(Signal::Value(Value::string(crate::value::format_number(n))))
            }
            "number" => {
                let s = values
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| RuntimeError::new(line, "number expects 1 string argument"))?;
                Ok(Signal::Value(Value::number(s.trim().parse().unwrap_or(0.0))))
            }
            "sizeof" => {
                let v = values.first().ok_or_else(|| RuntimeError::new(line, "sizeof expects 1 argument"))?;
                Ok(Signal::Value(Value::number(v.shallow_bytes() as f64)))
            }
            "sequence" => {
                let a = values.first().and_then(Value::as_number).ok_or_else(|| RuntimeError::new(line, "sequence expects 2 numbers"))?;
                let b = values.get(1).and_then(Value::as_number).ok_or_else(|| RuntimeError::new(line, "sequence expects 2 numbers"))?;
                let mut out = Vec::new();
                let mut cur = a;
                while cur < b {
                    out.push(Value::number(cur));
                    cur += 1.0;
                }
                Ok(Signal::Value(Value::array(out)))
            }
            other => Err(RuntimeError::new(line, format!("unknown built-in '{other}'"))),
        }
    }

    fn register_module(&mut self, name: &str, line: u32) -> Result<(), RuntimeError> {
        match name {
            "vcore" => crate::modules::vcore::setup(&mut self.namespaces, &mut self.interner),
            "vmath" => crate::modules::vmath::setup(&mut self.namespaces, &mut self.interner),
            "vglib" => crate::modules::vglib::setup(&mut self.namespaces, &mut self.interner),
            "vmem" => crate::modules::vmem::setup(&mut self.namespaces, &mut self.interner),
            other => return Err(RuntimeError::new(line, format!("unknown module '{other}'"))),
        }
        Ok(())
    }
}

fn array_index(idx: &Value, len: usize, line: u32) -> Result<usize, RuntimeError> {
    let n = idx.as_number().ok_or_else(|| RuntimeError::new(line, "array index must be a number"))?;
    if n < 0.0 || n.fract() != 0.0 || n as usize >= len {
        return Err(RuntimeError::new(line, format!("index {n} out of bounds (len {len})")));
    }
    Ok(n as usize)
}

fn materialize_range(start: &Value, end: &Value, line: u32) -> Result<Vec<Value>, RuntimeError> {
    let a = start.as_number().ok_or_else(|| RuntimeError::new(line, "range bounds must be numbers"))?.floor();
    let b = end.as_number().ok_or_else(|| RuntimeError::new(line, "range bounds must be numbers"))?.floor();
    let mut out = Vec::new();
    let mut cur = a;
    while cur <= b {
        out.push(Value::number(cur));
        cur += 1.0;
    }
    Ok(out)
}

fn apply_binop(op: BinOp, l: &Value, r: &Value, line: u32) -> Result<Value, RuntimeError> {
    use crate::value::Type;

    match op {
        BinOp::Equal => return Ok(Value::boolean(l.value_eq(r))),
        BinOp::NotEqual => return Ok(Value::boolean(!l.value_eq(r))),
        _ => {}
    }

    match (l.value_type(), r.value_type(), op) {
        (Type::String, _, BinOp::Add) | (_, Type::String, BinOp::Add) => {
            Ok(Value::string(format!("{}{}", l.to_display_string(), r.to_display_string())))
        }
        (Type::Array, Type::Array, BinOp::Add) => {
            let mut out = l.as_array().unwrap().borrow().clone();
            out.extend(r.as_array().unwrap().borrow().iter().cloned());
            Ok(Value::array(out))
        }
        (Type::Number, Type::Number, _) => {
            let a = l.as_number().unwrap();
            let b = r.as_number().unwrap();
            match op {
                BinOp::Add => Ok(Value::number(a + b)),
                BinOp::Subtract => Ok(Value::number(a - b)),
                BinOp::Multiply => Ok(Value::number(a * b)),
                BinOp::Divide => {
                    if b == 0.0 {
                        Err(RuntimeError::new(line, "division by zero"))
                    } else {
                        Ok(Value::number(a / b))
                    }
                }
                BinOp::FloorDivide => {
                    if b == 0.0 {
                        Err(RuntimeError::new(line, "division by zero"))
                    } else {
                        Ok(Value::number((a / b).floor()))
                    }
                }
                BinOp::Modulo => {
                    if b == 0.0 {
                        Err(RuntimeError::new(line, "modulo by zero"))
                    } else {
                        Ok(Value::number(a % b))
                    }
                }
                BinOp::Less => Ok(Value::boolean(a < b)),
                BinOp::LessEqual => Ok(Value::boolean(a <= b)),
                BinOp::Greater => Ok(Value::boolean(a > b)),
                BinOp::GreaterEqual => Ok(Value::boolean(a >= b)),
                BinOp::Equal | BinOp::NotEqual | BinOp::And | BinOp::Or => unreachable!("handled above or by caller"),
            }
        }
        (lt, rt, op) => Err(RuntimeError::new(line, format!("unsupported operands for '{op}': {lt} and {rt}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(src: &str) -> Value {
        let mut interner = Interner::new();
        let (tokens, _) = Lexer::new(src).tokenize();
        let program = Parser::new(tokens, &mut interner).parse_program().expect("parse ok");
        let mut interp = Interpreter::new();
        interp.interner = interner;
        interp.run_program(&program).expect("run ok").unwrap_or(Value::null())
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run("1 + 2 * 3;").as_number(), Some(7.0));
    }

    #[test]
    fn array_sort_mutates_in_place() {
        let v = run("a = [3, 1, 2]; a.sort(); a;");
        assert_eq!(
            v.as_array().unwrap().borrow().iter().map(|x| x.as_number().unwrap()).collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn factorial_recursion() {
        assert_eq!(run("sub fact(n) { if n <= 1 { return 1; } return n * fact(n - 1); } fact(5);").as_number(), Some(120.0));
    }

    #[test]
    fn group_scoped_access() {
        assert_eq!(run("group g { x = 10; } g.x;").as_number(), Some(10.0));
    }

    #[test]
    fn undefined_variable_is_runtime_error() {
        let mut interner = Interner::new();
        let (tokens, _) = Lexer::new("x;").tokenize();
        let program = Parser::new(tokens, &mut interner).parse_program().unwrap();
        let mut interp = Interpreter::new();
        interp.interner = interner;
        let err = interp.run_program(&program).unwrap_err();
        assert!(err.message.contains("not found"));
    }

    #[test]
    fn through_collect_squares() {
        let v = run("through i:: 1..3 -> collect { i * i; };");
        let nums: Vec<f64> = v.as_array().unwrap().borrow().iter().map(|x| x.as_number().unwrap()).collect();
        assert_eq!(nums, vec![1.0, 4.0, 9.0]);
    }

    #[test]
    fn const_reassignment_is_runtime_error() {
        let mut interner = Interner::new();
        let (tokens, _) = Lexer::new("const pi = 3.14; pi = 3;").tokenize();
        let program = Parser::new(tokens, &mut interner).parse_program().unwrap();
        let mut interp = Interpreter::new();
        interp.interner = interner;
        let err = interp.run_program(&program).unwrap_err();
        assert!(err.message.contains("read-only"));
    }

    #[test]
    fn call_frame_is_dropped_after_return() {
        let mut interner = Interner::new();
        let (tokens, _) = Lexer::new("sub f(n) { return n; } f(1);").tokenize();
        let program = Parser::new(tokens, &mut interner).parse_program().unwrap();
        let mut interp = Interpreter::new();
        interp.interner = interner;
        interp.run_program(&program).unwrap();
        assert!(interp.namespaces.groups().all(|g| !g.starts_with("call_")));
    }

    #[test]
    fn short_circuit_and_does_not_evaluate_rhs() {
        assert_eq!(run("0 && (1/0);").as_number(), Some(0.0));
    }
}
