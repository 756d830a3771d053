use std::{
    fmt::{Debug, Formatter},
    str::Chars,
};

/// 1-based source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub struct Line(pub usize);

impl Default for Line {
    fn default() -> Self {
        Line(1)
    }
}

/// Forward-only position in a source text.
///
/// Advancing past a `\n` bumps the line counter, so every construct that spans lines
/// (strings, block comments) gets its line bookkeeping for free. Cloning a cursor is cheap
/// and is how the scanner remembers where a lexeme started.
#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    chars: Chars<'a>,
    line: Line,
}

impl<'a> Debug for Cursor<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The remaining source is usually too verbose, only print it when asked for
        if f.alternate() {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("offset", &self.offset())
                .field("rest", &self.chars.as_str())
                .finish()
        } else {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("offset", &self.offset())
                .finish()
        }
    }
}

impl<'a> PartialEq for Cursor<'a> {
    fn eq(&self, other: &Self) -> bool {
        (self.source, self.chars.as_str()) == (other.source, other.chars.as_str())
    }
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, chars: source.chars(), line: Line::default() }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    /// Byte offset into the source.
    pub fn offset(&self) -> usize {
        self.source.len() - self.chars.as_str().len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    /// Consumes the next character only if it is `expected`.
    pub fn consume_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `predicate` holds, leaving the first mismatch unconsumed.
    pub fn consume_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.next();
        }
    }

    /// The text between `self` and a later cursor `end` over the same source.
    pub fn slice_until(&self, end: &Cursor<'a>) -> &'a str {
        assert!(self.source == end.source);
        &self.source[self.offset()..end.offset()]
    }
}

impl<'a> From<&'a str> for Cursor<'a> {
    fn from(source: &'a str) -> Self {
        Self::new(source)
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line.0 += 1;
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn slice_until() {
        let mut cursor: Cursor = "ab\ncd\n\n".into();

        cursor.next(); // 'a'

        let start = cursor.clone();

        cursor.next(); // 'b'
        cursor.next(); // '\n'
        cursor.next(); // 'c'

        assert_eq!(start.slice_until(&cursor), "b\nc");
        assert_eq!(start.slice_until(&start), "");
    }

    #[test]
    fn lookahead_does_not_consume() {
        let mut cursor = Cursor::new("ab");

        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek_next(), Some('b'));
        assert_eq!(cursor.offset(), 0);

        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.peek(), Some('b'));
        assert_eq!(cursor.peek_next(), None);

        assert_eq!(cursor.next(), Some('b'));
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn consume_if() {
        let mut cursor = Cursor::new("!=");

        assert!(!cursor.consume_if('='));
        assert!(cursor.consume_if('!'));
        assert!(cursor.consume_if('='));
        assert!(!cursor.consume_if('='));
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn consume_while() {
        let mut cursor = Cursor::new("123.5");
        let start = cursor.clone();

        cursor.consume_while(|c| c.is_ascii_digit());

        assert_eq!(start.slice_until(&cursor), "123");
        assert_eq!(cursor.peek(), Some('.'));
    }

    #[test]
    fn line_counting() {
        let mut cursor = Cursor::new("a\n\nb");
        assert_eq!(cursor.line(), Line(1));

        cursor.next(); // 'a'
        assert_eq!(cursor.line(), Line(1));

        cursor.next(); // '\n'
        assert_eq!(cursor.line(), Line(2));

        cursor.next(); // '\n'
        assert_eq!(cursor.line(), Line(3));

        cursor.next(); // 'b'
        assert_eq!(cursor.line(), Line(3));

        // Peeking a newline doesn't count it
        let cursor = Cursor::new("\n");
        assert_eq!(cursor.peek(), Some('\n'));
        assert_eq!(cursor.line(), Line(1));
    }

    #[test]
    fn multibyte_offsets() {
        let mut cursor = Cursor::new("äb");
        let start = cursor.clone();

        cursor.next();
        assert_eq!(cursor.offset(), 'ä'.len_utf8());
        assert_eq!(start.slice_until(&cursor), "ä");
    }
}
