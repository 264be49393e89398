use super::token::{Command, Token};

/// Scanner over Brainfuck source bytes
///
/// Yields one [`Token`] per command byte and skips everything else. The
/// scanner is an iterator so the translator can consume it in a single pass.
pub struct Scanner<'a> {
    /// Source bytes
    source: &'a [u8],
    /// Current position in source
    current: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner over the given source
    pub fn new(source: &'a [u8]) -> Self {
        Scanner { source, current: 0 }
    }

    /// Scans all tokens and returns them as a vector
    pub fn scan_tokens(self) -> Vec<Token> {
        self.collect()
    }

    /// Length of the underlying source in bytes
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> u8 {
        let byte = self.source[self.current];
        self.current += 1;
        byte
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while !self.is_at_end() {
            let offset = self.current;
            if let Some(kind) = Command::from_byte(self.advance()) {
                return Some(Token::new(kind, offset));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.source.len() - self.current))
    }
}

/// Converts a byte offset into a 1-indexed `(line, column)` pair
///
/// Offsets past the end map to the position just after the last byte.
pub fn line_col(source: &[u8], offset: usize) -> (usize, usize) {
    let end = offset.min(source.len());
    let mut line = 1;
    let mut column = 1;
    for &byte in &source[..end] {
        if byte == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
