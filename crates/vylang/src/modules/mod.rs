//! Standard native modules, registered via the
//! `setup_<name>(namespaces, interner)` contract: create `global.<name>`
//! and deposit native function/constant values under interned ids. Each
//! module's internals are a faithful-enough stand-in grounded in
//! `original_source`'s equivalents; only the registration contract itself
//! is normative.

pub mod vcore;
pub mod vglib;
pub mod vmath;
pub mod vmem;

use std::rc::Rc;

use crate::intern::{Interner, StringId};
use crate::namespace::Namespaces;
use crate::value::{FunctionData, NativeFn, Value};

fn module_group(name: &str) -> String {
    format!("global.{name}")
}

/// Builds a read-only native function value, `is_native = true` so the
/// evaluator never tries to run it through the AST body.
fn native_fn(name: &str, f: NativeFn) -> Value {
    Value::function(FunctionData { param_ids: Vec::new(), body: Rc::from([]), native_fn: Some(f), is_native: true, name: name.to_owned() })
        .with_read_only(true)
}

/// Interns `name` and deposits `value` into `module`'s group table.
fn define(namespaces: &mut Namespaces, interner: &mut Interner, module: &str, name: &str, value: Value) {
    let group = module_group(module);
    namespaces.ensure_group(&group);
    let id: StringId = interner.intern(name);
    namespaces.define(&group, id.index() as u32, value);
}
