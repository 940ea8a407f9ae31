//! String interning for identifier and literal text.
//!
//! Parsing and symbol-table lookups compare identifiers constantly; interning
//! turns those comparisons into pointer/index comparisons and gives every
//! distinct name a single owned allocation.

use rustc_hash::FxHashMap;
use std::rc::Rc;

/// An interned string. Cheap to clone (refcounted), compares by pointer
/// first and falls back to content only when the pointers differ (this can
/// happen across independently-built interners, e.g. in tests).
#[derive(Clone, Debug, Eq)]
pub struct Atom(Rc<str>);

impl Atom {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl std::hash::Hash for Atom {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A simple string interner, not thread-shared. Each parse/lex session owns
/// one.
#[derive(Default)]
pub struct Interner {
    map: FxHashMap<Rc<str>, ()>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Atom {
        if let Some((existing, _)) = self.map.get_key_value(text) {
            return Atom(existing.clone());
        }
        let rc: Rc<str> = Rc::from(text);
        self.map.insert(rc.clone(), ());
        Atom(rc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_yields_equal_atoms() {
        let mut interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_text_yields_distinct_atoms() {
        let mut interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("world");
        assert_ne!(a, b);
    }
}
