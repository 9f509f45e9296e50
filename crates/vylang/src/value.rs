//! Runtime value representation.
//!
//! `Value` is a tagged union over `{null, number, string, array, function,
//! module}`. Heap-backed variants (`String`, `Array`, `Function`) use `Rc`
//! so that looking an array up by variable name and mutating it through a
//! method call is observable through every other holder of that binding.
//! A single boxed representation would lose that aliasing, so we keep the
//! payloads distinct rather than flattening to `Rc<dyn Any>`.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::ast::AstNode;
use crate::intern::StringId;
use crate::namespace::Namespaces;

/// A user- or native-defined callable.
///
/// A user function owns `body` (shared with the `FunctionDef` node that
/// produced it); a native function owns `native_fn` and leaves `body`
/// empty. Exactly one of the two is meaningful, selected by `is_native`.
pub struct FunctionData {
    pub param_ids: Vec<u32>,
    pub body: Rc<[AstNode]>,
    pub native_fn: Option<NativeFn>,
    pub is_native: bool,
    pub name: String,
}

/// Host callback shape accepted by the native module registration
/// contract: takes the call's evaluated arguments and a view onto
/// interpreter-owned state, returns a `Value` or a runtime error.
pub type NativeFn = Rc<dyn Fn(&mut Vec<Value>, &NativeCtx) -> Result<Value, crate::error::RuntimeError>>;

/// What a native function needs to see of the interpreter besides its
/// arguments: the interner (for `vmem`/error messages) and, for
/// whole-environment introspection (`vmem.usage()` with no argument), the
/// live symbol container.
pub struct NativeCtx<'a> {
    pub interner: &'a crate::intern::Interner,
    pub namespaces: &'a Namespaces,
}

impl fmt::Debug for FunctionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionData")
            .field("name", &self.name)
            .field("is_native", &self.is_native)
            .field("param_ids", &self.param_ids)
            .finish_non_exhaustive()
    }
}

/// A registered native module handle: `{ module_id, name }`, read-only
/// once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleData {
    pub module_id: StringId,
    pub name: String,
}

#[derive(Debug, Clone)]
enum ValueData {
    Null,
    Number(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Function(Rc<FunctionData>),
    Module(Rc<ModuleData>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("data", &self.data)
            .field("read_only", &self.read_only)
            .finish()
    }
}

/// A tagged union over `{null, number, string, array, function, module}`
/// carrying a per-binding read-only flag (set by `const` or by native
/// module registration; see the GLOSSARY entry "Read-only flag").
#[derive(Clone)]
pub struct Value {
    data: ValueData,
    read_only: bool,
}

/// The six value tags, used by `type()`, error messages, and the static
/// type checks the parser performs for `::Type` annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
pub enum Type {
    Null,
    Number,
    String,
    Array,
    Function,
    Module,
}

impl Value {
    pub fn null() -> Self {
        Self { data: ValueData::Null, read_only: false }
    }

    pub fn number(n: f64) -> Self {
        Self { data: ValueData::Number(n), read_only: false }
    }

    pub fn boolean(b: bool) -> Self {
        Self::number(if b { 1.0 } else { 0.0 })
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Self { data: ValueData::String(s.into()), read_only: false }
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Self { data: ValueData::Array(Rc::new(RefCell::new(elements))), read_only: false }
    }

    /// Wraps an existing array allocation as a `Value`, used by mutating
    /// array methods that return the receiver without copying.
    pub fn array_handle(rc: &Rc<RefCell<Vec<Value>>>) -> Self {
        Self { data: ValueData::Array(Rc::clone(rc)), read_only: false }
    }

    pub fn function(f: FunctionData) -> Self {
        Self { data: ValueData::Function(Rc::new(f)), read_only: false }
    }

    pub fn module(module_id: StringId, name: impl Into<String>) -> Self {
        Self {
            data: ValueData::Module(Rc::new(ModuleData { module_id, name: name.into() })),
            read_only: true,
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn value_type(&self) -> Type {
        match &self.data {
            ValueData::Null => Type::Null,
            ValueData::Number(_) => Type::Number,
            ValueData::String(_) => Type::String,
            ValueData::Array(_) => Type::Array,
            ValueData::Function(_) => Type::Function,
            ValueData::Module(_) => Type::Module,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.data {
            ValueData::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            ValueData::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Rc<RefCell<Vec<Value>>>> {
        match &self.data {
            ValueData::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionData>> {
        match &self.data {
            ValueData::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&ModuleData> {
        match &self.data {
            ValueData::Module(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness: numbers are truthy when non-zero, strings and
    /// arrays when non-empty; functions/modules/null are never truthy in
    /// condition position (the grammar never asks, but we define it for
    /// completeness).
    pub fn is_truthy(&self) -> bool {
        match &self.data {
            ValueData::Null => false,
            ValueData::Number(n) => *n != 0.0,
            ValueData::String(s) => !s.is_empty(),
            ValueData::Array(a) => !a.borrow().is_empty(),
            ValueData::Function(_) | ValueData::Module(_) => true,
        }
    }

    /// `toString`: numbers render shortest-decimal with no trailing
    /// zeros/dot, strings render raw, arrays as `[e1, e2, ...]` using each
    /// element's `toString`, functions/modules/null as fixed literals.
    pub fn to_display_string(&self) -> String {
        match &self.data {
            ValueData::Null => "null".to_owned(),
            ValueData::Number(n) => format_number(*n),
            ValueData::String(s) => s.to_string(),
            ValueData::Array(a) => {
                let items: Vec<String> = a.borrow().iter().map(Value::to_display_string).collect();
                format!("[{}]", items.join(", "))
            }
            ValueData::Function(_) => "<function>".to_owned(),
            ValueData::Module(m) => format!("<module '{}'>", m.name),
        }
    }

    /// Shallow byte size: a value's own payload, not its contents'
    /// containers.
    pub fn shallow_bytes(&self) -> usize {
        match &self.data {
            ValueData::Null => 0,
            ValueData::Number(_) => std::mem::size_of::<f64>(),
            ValueData::String(s) => s.len(),
            ValueData::Array(a) => a.borrow().iter().map(Value::shallow_bytes).sum(),
            ValueData::Function(_) | ValueData::Module(_) => 0,
        }
    }

    /// Deep byte size: shallow bytes plus recursive container
    /// overhead, used by `vmem.usage`.
    pub fn deep_bytes(&self) -> usize {
        const CONTAINER_OVERHEAD: usize = std::mem::size_of::<usize>() * 3;
        match &self.data {
            ValueData::Null => 0,
            ValueData::Number(_) => std::mem::size_of::<f64>(),
            ValueData::String(s) => CONTAINER_OVERHEAD + s.len(),
            ValueData::Array(a) => {
                CONTAINER_OVERHEAD + a.borrow().iter().map(Value::deep_bytes).sum::<usize>()
            }
            ValueData::Function(_) | ValueData::Module(_) => CONTAINER_OVERHEAD,
        }
    }

    /// A stable-looking address for `vmem.address`. Heap-backed values use
    /// their `Rc` allocation's address; immediates (which own no heap
    /// allocation) get a sentinel, since there is nothing meaningful to
    /// point at.
    pub fn heap_address(&self) -> String {
        match &self.data {
            ValueData::Null | ValueData::Number(_) => "0x0".to_owned(),
            ValueData::String(s) => format!("{:#x}", Rc::as_ptr(s).cast::<()>() as usize),
            ValueData::Array(a) => format!("{:#x}", Rc::as_ptr(a).cast::<()>() as usize),
            ValueData::Function(f) => format!("{:#x}", Rc::as_ptr(f).cast::<()>() as usize),
            ValueData::Module(m) => format!("{:#x}", Rc::as_ptr(m).cast::<()>() as usize),
        }
    }

    /// Equality: only same-tag values compare equal (besides the
    /// mixed-tag rule that any cross-tag comparison is false).
    pub fn value_eq(&self, other: &Self) -> bool {
        match (&self.data, &other.data) {
            (ValueData::Null, ValueData::Null) => true,
            (ValueData::Number(a), ValueData::Number(b)) => a == b,
            (ValueData::String(a), ValueData::String(b)) => a == b,
            (ValueData::Array(a), ValueData::Array(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.value_eq(y))
            }
            (ValueData::Function(a), ValueData::Function(b)) => Rc::ptr_eq(a, b),
            (ValueData::Module(a), ValueData::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Ordering: numbers by IEEE order, strings lexicographically,
    /// arrays have no ordering, everything else falls back to comparing
    /// tag ordinals when tags differ (used only by `<`/`<=`/`>`/`>=`).
    pub fn partial_cmp_value(&self, other: &Self) -> Option<Ordering> {
        match (&self.data, &other.data) {
            (ValueData::Number(a), ValueData::Number(b)) => a.partial_cmp(b),
            (ValueData::String(a), ValueData::String(b)) => Some(a.as_ref().cmp(b.as_ref())),
            _ if std::mem::discriminant(&self.data) != std::mem::discriminant(&other.data) => {
                Some(tag_ordinal(&self.data).cmp(&tag_ordinal(&other.data)))
            }
            _ => None,
        }
    }
}

fn tag_ordinal(data: &ValueData) -> u8 {
    match data {
        ValueData::Null => 0,
        ValueData::Number(_) => 1,
        ValueData::String(_) => 2,
        ValueData::Array(_) => 3,
        ValueData::Function(_) => 4,
        ValueData::Module(_) => 5,
    }
}

/// Shortest round-tripping decimal form with no trailing zeros or dot,
/// matching `string(x)` and `toString`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n.is_sign_negative() { "-inf".to_owned() } else { "inf".to_owned() };
    }
    if n == n.trunc() && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let mut buf = ryu::Buffer::new();
    let mut s = buf.format(n).to_owned();
    if let Some(dot) = s.find('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') || s.len() == dot {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_spec() {
        assert!(!Value::number(0.0).is_truthy());
        assert!(Value::number(-1.0).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::string("x").is_truthy());
        assert!(!Value::array(vec![]).is_truthy());
        assert!(!Value::null().is_truthy());
    }

    #[test]
    fn numbers_format_without_trailing_zeros() {
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(3.10), "3.1");
    }

    #[test]
    fn array_equality_is_elementwise() {
        let a = Value::array(vec![Value::number(1.0), Value::number(2.0)]);
        let b = Value::array(vec![Value::number(1.0), Value::number(2.0)]);
        let c = Value::array(vec![Value::number(1.0), Value::number(3.0)]);
        assert!(a.value_eq(&b));
        assert!(!a.value_eq(&c));
    }

    #[test]
    fn shared_array_mutation_is_observable_through_every_holder() {
        let a = Value::array(vec![Value::number(1.0)]);
        let b = a.clone();
        a.as_array().unwrap().borrow_mut().push(Value::number(2.0));
        assert_eq!(b.as_array().unwrap().borrow().len(), 2);
    }

    #[test]
    fn mixed_tag_equality_is_false_and_ordering_falls_back_to_tag() {
        let n = Value::number(1.0);
        let s = Value::string("1");
        assert!(!n.value_eq(&s));
        assert_eq!(n.partial_cmp_value(&s), Some(Ordering::Less));
    }
}
