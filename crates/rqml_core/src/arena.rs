//! Arena allocation for syntax trees.
//!
//! Every node of a parsed QML document lives in one bump arena. Dropping the
//! arena frees the whole tree at once.

use bumpalo::Bump;

/// Owns the bump allocator a parse allocates into.
///
/// The parser borrows the inner `Bump`; the resulting `Program<'a>` is tied to
/// this arena's lifetime.
pub struct SyntaxArena {
    bump: Bump,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create an arena sized for a source text of `source_len` bytes.
    pub fn for_source(source_len: usize) -> Self {
        Self {
            bump: Bump::with_capacity(source_len.saturating_mul(8)),
        }
    }

    #[inline]
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Free every node while keeping the memory for the next parse.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Default for SyntaxArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Move a `Vec` into the arena and return it as a slice.
pub fn alloc_slice<'a, T>(bump: &'a Bump, items: Vec<T>) -> &'a [T] {
    bump.alloc_slice_fill_iter(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_slice_keeps_order() {
        let arena = SyntaxArena::new();
        let slice = alloc_slice(arena.bump(), vec![3, 1, 2]);
        assert_eq!(slice, &[3, 1, 2]);
        assert!(arena.allocated_bytes() > 0);
    }
}
