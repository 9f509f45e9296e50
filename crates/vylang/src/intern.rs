//! Process-lifetime string interner shared by the parser and the evaluator.
//!
//! Every identifier, group-path component, and method name that needs stable,
//! cheap-to-compare storage goes through here. Ids are dense and monotonic;
//! once handed out they never move or invalidate (see `Interner::get`), which
//! is what lets the symbol container use bare `u32`s as table keys.

use ahash::AHashMap;

/// A stable handle into the interner's backing storage.
///
/// `u32` keeps symbol-table keys small; 4 billion distinct identifiers is
/// far beyond what a single program will ever intern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Reconstructs a `StringId` from a raw index, for callers (the CLI's
    /// `view tree`) that only have the `u32` stored as a symbol-table key.
    #[inline]
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }
}

/// The string pool. Owns the canonical storage for every
/// interned string; callers borrow by id via [`Interner::get`].
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    ids: AHashMap<Box<str>, StringId>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `s` if absent, returning its id either way. Idempotent:
    /// interning the same text twice always yields the same id.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }
        let id = StringId(self.strings.len() as u32);
        self.strings.push(s.into());
        self.ids.insert(s.into(), id);
        id
    }

    /// Borrows the string stored under `id`.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this interner (ids never
    /// invalidate, but they also never cross interner instances).
    pub fn get(&self, id: StringId) -> &str {
        &self.strings[id.index()]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut pool = Interner::new();
        let a = pool.intern("foo");
        let b = pool.intern("foo");
        let c = pool.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ids_are_dense_and_stable() {
        let mut pool = Interner::new();
        let a = pool.intern("alpha");
        let b = pool.intern("beta");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(pool.get(a), "alpha");
        assert_eq!(pool.get(b), "beta");
    }

    #[test]
    fn roundtrips_arbitrary_strings() {
        let mut pool = Interner::new();
        for s in ["", "x", "global.outer.inner", "call_fact_3"] {
            let id = pool.intern(s);
            assert_eq!(pool.get(id), s);
        }
    }
}
