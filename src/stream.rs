//! Source positions and the character cursor shared by both lexers.

use serde::{Deserialize, Serialize};

/// A location in the source text.
///
/// `offset` is a byte offset, `line` is 1-based and `column` is 0-based
/// (counted in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { offset: 0, line: 1, column: 0 }
    }
}

/// A half-open `[start, end)` range of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The text this span covers, or an empty string when the span does not
    /// belong to `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start.offset..self.end.offset).unwrap_or("")
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }
}

/// An indexable, line/column-tracking cursor over one source string.
///
/// Reading past the end never fails; `peek` and `get` return `None` instead.
#[derive(Debug, Clone)]
pub struct CharacterStream<'src> {
    source: &'src str,
    pos: Position,
}

impl<'src> CharacterStream<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, pos: Position::default() }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// The position of the next character to read.
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos.offset >= self.source.len()
    }

    /// Looks `ahead` characters past the cursor without consuming anything.
    pub fn peek(&self, ahead: usize) -> Option<char> {
        self.source.get(self.pos.offset..)?.chars().nth(ahead)
    }

    /// Consumes one character, updating line and column.
    pub fn get(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos.offset..)?.chars().next()?;
        self.pos.offset += ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 0;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    /// Consumes `count` characters.
    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            if self.get().is_none() {
                break;
            }
        }
    }

    /// True when the unread text starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.tail().starts_with(prefix)
    }

    /// The unread text.
    pub fn tail(&self) -> &'src str {
        self.get_tail(self.pos.offset)
    }

    /// The source text from byte offset `from` to the end.
    pub fn get_tail(&self, from: usize) -> &'src str {
        self.source.get(from..).unwrap_or("")
    }

    /// Moves the cursor back (or forward) to a position previously obtained
    /// from [`CharacterStream::position`].
    pub fn reset(&mut self, pos: Position) {
        self.pos = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column_tracking() {
        let mut s = CharacterStream::new("ab\ncd");
        assert_eq!(s.get(), Some('a'));
        assert_eq!(s.get(), Some('b'));
        assert_eq!(s.position(), Position { offset: 2, line: 1, column: 2 });
        assert_eq!(s.get(), Some('\n'));
        assert_eq!(s.position(), Position { offset: 3, line: 2, column: 0 });
        assert_eq!(s.peek(1), Some('d'));
        s.skip(2);
        assert!(s.is_eof());
        assert_eq!(s.get(), None);
        assert_eq!(s.peek(0), None);
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut s = CharacterStream::new("é=1");
        assert_eq!(s.get(), Some('é'));
        assert_eq!(s.position().offset, 2);
        assert_eq!(s.position().column, 1);
        assert_eq!(s.tail(), "=1");
        assert_eq!(s.get_tail(0), "é=1");
    }

    #[test]
    fn test_reset() {
        let mut s = CharacterStream::new("hello");
        let start = s.position();
        s.skip(3);
        s.reset(start);
        assert_eq!(s.peek(0), Some('h'));
        assert!(s.starts_with("hel"));
    }

    #[test]
    fn test_span_slice() {
        let src = "let x = 1;";
        let span = Span::new(
            Position { offset: 4, line: 1, column: 4 },
            Position { offset: 5, line: 1, column: 5 },
        );
        assert_eq!(span.slice(src), "x");
    }
}
