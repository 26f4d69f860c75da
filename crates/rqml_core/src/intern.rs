//! Atom table for property and scope member names.
//!
//! Names are interned once per analysis so that scope lookups compare `u32`
//! handles instead of strings.

use lasso::{Rodeo, Spur};
use std::fmt;

/// An interned name. Comparing two atoms is an integer comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Atom(Spur);

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", self.0)
    }
}

/// Single-owner interner backing the inference engine.
#[derive(Default)]
pub struct AtomTable {
    rodeo: Rodeo,
}

impl AtomTable {
    pub fn new() -> Self {
        Self { rodeo: Rodeo::new() }
    }

    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        Atom(self.rodeo.get_or_intern(s))
    }

    /// Look up an already-interned name without interning it.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.rodeo.get(s).map(Atom)
    }

    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.rodeo.resolve(&atom.0)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl fmt::Debug for AtomTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomTable").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let mut atoms = AtomTable::new();
        let a = atoms.intern("width");
        let b = atoms.intern("width");
        let c = atoms.intern("height");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(atoms.resolve(c), "height");
    }

    #[test]
    fn test_get_does_not_intern() {
        let mut atoms = AtomTable::new();
        assert!(atoms.get("id").is_none());
        let id = atoms.intern("id");
        assert_eq!(atoms.get("id"), Some(id));
        assert_eq!(atoms.len(), 1);
    }
}
