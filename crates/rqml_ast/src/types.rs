//! Flag and handle types for the syntax tree.

use std::cell::Cell;
use std::fmt;

bitflags::bitflags! {
    /// Per-token flags recorded by the scanner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        const NONE                 = 0;
        const PRECEDING_LINE_BREAK = 1 << 0;
        const UNTERMINATED         = 1 << 1;
        const HEX_SPECIFIER        = 1 << 2;
        const OCTAL                = 1 << 3;
        const SCIENTIFIC           = 1 << 4;
        /// Identifier spelled with a `\uXXXX` escape.
        const UNICODE_ESCAPE       = 1 << 5;
    }
}

/// Handle to a scope in the inference engine's scope tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// Slot on a scope-owning node, written once by scope gathering.
pub type ScopeSlot = Cell<Option<ScopeId>>;

/// The name the loose parser gives to identifiers it had to invent.
pub const DUMMY_IDENTIFIER: &str = "✖";
