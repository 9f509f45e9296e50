//! The symbol container: a two-level map, group path → (id → Value).
//! `ahash` keys the outer map; `IndexMap` keeps each group's bindings in
//! insertion order so `view tree` and `vmem.usage()` walk deterministically.

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::value::Value;

pub const GLOBAL: &str = "global";

#[derive(Debug, Default)]
pub struct Namespaces {
    groups: AHashMap<String, IndexMap<u32, Value>>,
}

impl Namespaces {
    pub fn new() -> Self {
        let mut groups = AHashMap::default();
        groups.insert(GLOBAL.to_owned(), IndexMap::new());
        Self { groups }
    }

    pub fn lookup(&self, group: &str, id: u32) -> Option<&Value> {
        self.groups.get(group)?.get(&id)
    }

    pub fn define(&mut self, group: &str, id: u32, value: Value) {
        self.groups.entry(group.to_owned()).or_default().insert(id, value);
    }

    pub fn erase(&mut self, group: &str, id: u32) {
        if let Some(table) = self.groups.get_mut(group) {
            table.shift_remove(&id);
        }
    }

    pub fn drop_group(&mut self, group: &str) {
        self.groups.remove(group);
    }

    pub fn group_exists(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn ensure_group(&mut self, group: &str) {
        self.groups.entry(group.to_owned()).or_default();
    }

    pub fn iterate(&self, group: &str) -> impl Iterator<Item = (u32, &Value)> {
        self.groups.get(group).into_iter().flat_map(|table| table.iter().map(|(&id, v)| (id, v)))
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Scoped lookup: try the target group first (the explicit scope path
    /// if one was given, else `current_group`), then always fall back to
    /// `global` if that lookup misses.
    pub fn resolve_lookup(
        &self,
        current_group: &str,
        scope_path: Option<&str>,
        id: u32,
        original_name: &str,
        line: u32,
    ) -> Result<&Value, RuntimeError> {
        let target_group = scope_path.unwrap_or(current_group);
        if let Some(v) = self.lookup(target_group, id) {
            return Ok(v);
        }
        if target_group != GLOBAL {
            if let Some(v) = self.lookup(GLOBAL, id) {
                return Ok(v);
            }
        }
        Err(RuntimeError::new(line, format!("Variable '{original_name}' not found")))
    }

    /// Assignment target resolution: an explicit scope path must
    /// resolve to an existing binding (no global fallback); otherwise the
    /// write lands in `current_group` regardless of whether the name
    /// already exists there.
    pub fn resolve_assignment_group<'a>(
        &self,
        current_group: &'a str,
        scope_path: Option<&'a str>,
        id: u32,
        original_name: &str,
        line: u32,
    ) -> Result<&'a str, RuntimeError> {
        match scope_path {
            Some(path) => {
                if self.lookup(path, id).is_some() {
                    Ok(path)
                } else {
                    Err(RuntimeError::new(line, format!("Variable '{original_name}' not found")))
                }
            }
            None => Ok(current_group),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_always_exists() {
        let ns = Namespaces::new();
        assert!(ns.group_exists(GLOBAL));
    }

    #[test]
    fn lookup_falls_back_to_global() {
        let mut ns = Namespaces::new();
        ns.define(GLOBAL, 1, Value::number(7.0));
        let v = ns.resolve_lookup("global.outer", None, 1, "x", 1).unwrap();
        assert_eq!(v.as_number(), Some(7.0));
    }

    #[test]
    fn lookup_prefers_current_group_over_global() {
        let mut ns = Namespaces::new();
        ns.define(GLOBAL, 1, Value::number(1.0));
        ns.define("global.outer", 1, Value::number(2.0));
        let v = ns.resolve_lookup("global.outer", None, 1, "x", 1).unwrap();
        assert_eq!(v.as_number(), Some(2.0));
    }

    #[test]
    fn drop_group_removes_all_bindings() {
        let mut ns = Namespaces::new();
        ns.define("call_f_0", 1, Value::number(1.0));
        ns.drop_group("call_f_0");
        assert!(!ns.group_exists("call_f_0"));
    }

    #[test]
    fn assignment_with_scope_path_requires_existing_binding() {
        let ns = Namespaces::new();
        let err = ns.resolve_assignment_group("global", Some("global.math"), 1, "x", 3).unwrap_err();
        assert_eq!(err.line, 3);
    }
}
