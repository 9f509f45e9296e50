//! `vmem`: exposes shallow/deep byte accounting to user code.
//! `usage()` with no argument sums every live binding in the environment,
//! since there's no single root object to deep-count from outside.

use std::rc::Rc;

use crate::error::RuntimeError;
use crate::intern::Interner;
use crate::namespace::Namespaces;
use crate::value::{NativeCtx, Value};

use super::{define, native_fn};

const MODULE: &str = "vmem";

pub fn setup(namespaces: &mut Namespaces, interner: &mut Interner) {
    define(namespaces, interner, MODULE, "address", native_fn("address", Rc::new(address)));
    define(namespaces, interner, MODULE, "usage", native_fn("usage", Rc::new(usage)));
}

fn address(args: &mut Vec<Value>, _ctx: &NativeCtx) -> Result<Value, RuntimeError> {
    let v = args.first().ok_or_else(|| RuntimeError::new(0, "address(v) expects 1 argument"))?;
    Ok(Value::string(v.heap_address()))
}

fn usage(args: &mut Vec<Value>, ctx: &NativeCtx) -> Result<Value, RuntimeError> {
    if let Some(v) = args.first() {
        return Ok(Value::number(v.deep_bytes() as f64));
    }
    let total: usize = ctx
        .namespaces
        .groups()
        .map(|group| ctx.namespaces.iterate(group).map(|(_, v)| v.deep_bytes()).sum::<usize>())
        .sum();
    Ok(Value::number(total as f64))
}
