//! Text ranges and line/column mapping for source location tracking.
//!
//! Every position in rqml is a *character* offset (a `char` index into the
//! source), never a byte offset. Node ranges, token ranges, diagnostics and
//! language-service positions all share that unit.

use std::fmt;

/// A position in source text, measured in characters from the start.
pub type TextPos = u32;

/// A half-open character range `[pos, end)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextRange {
    /// Offset where this range starts (inclusive).
    pub pos: TextPos,
    /// Offset where this range ends (exclusive).
    pub end: TextPos,
}

impl TextRange {
    #[inline]
    pub fn new(pos: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= pos, "range end {end} precedes start {pos}");
        Self { pos, end }
    }

    /// Create an empty range at a position.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { pos, end: pos }
    }

    #[inline]
    pub fn len(&self) -> TextPos {
        self.end - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    /// Whether this range contains a position (end exclusive).
    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.pos && pos < self.end
    }

    /// Whether this range contains or touches a position (end inclusive).
    ///
    /// Cursor-based queries use this form: a cursor sitting right after the
    /// last character of an identifier still refers to that identifier.
    #[inline]
    pub fn contains_inclusive(&self, pos: TextPos) -> bool {
        pos >= self.pos && pos <= self.end
    }

    /// Whether `other` lies entirely within this range.
    #[inline]
    pub fn encloses(&self, other: TextRange) -> bool {
        other.pos >= self.pos && other.end <= self.end
    }

    /// Return a new range covering both ranges.
    pub fn cover(&self, other: TextRange) -> TextRange {
        TextRange::new(self.pos.min(other.pos), self.end.max(other.end))
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.pos, self.end)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.pos, self.end)
    }
}

/// A source location as reported in ASTs and error messages:
/// 1-based line, 0-based column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An editor position: 0-based line, 0-based character.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LineAndColumn {
    pub line: u32,
    pub character: u32,
}

impl LineAndColumn {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A map from character offsets to line numbers, built from source text.
///
/// Line terminators are `\n`, `\r\n`, a lone `\r`, U+2028 and U+2029, matching
/// the scanner's notion of a line break.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Character offsets of the start of each line.
    line_starts: Vec<TextPos>,
    /// Total length in characters.
    len: TextPos,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        let mut chars = text.chars().peekable();
        let mut offset: TextPos = 0;
        while let Some(ch) = chars.next() {
            offset += 1;
            match ch {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                        offset += 1;
                    }
                    line_starts.push(offset);
                }
                '\n' | '\u{2028}' | '\u{2029}' => line_starts.push(offset),
                _ => {}
            }
        }
        Self {
            line_starts,
            len: offset,
        }
    }

    /// 0-based line index for a character offset.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => (line - 1) as u32,
        }
    }

    /// 0-based line and character for a character offset.
    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        let line_start = self.line_starts[line as usize];
        LineAndColumn {
            line,
            character: pos - line_start,
        }
    }

    /// 1-based line, 0-based column for a character offset.
    pub fn position_of(&self, pos: TextPos) -> Position {
        let lc = self.line_and_column_of(pos);
        Position::new(lc.line + 1, lc.character)
    }

    /// Convert a 0-based editor position back to a character offset, clamped
    /// to the end of the text.
    pub fn offset_of(&self, line: u32, character: u32) -> TextPos {
        match self.line_starts.get(line as usize) {
            Some(&start) => (start + character).min(self.len),
            None => self.len,
        }
    }

    /// Character offset of the start of a 0-based line.
    pub fn line_start(&self, line: u32) -> TextPos {
        self.line_starts[line as usize]
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_starts(&self) -> &[TextPos] {
        &self.line_starts
    }
}
