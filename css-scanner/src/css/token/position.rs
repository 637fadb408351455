//! Line and column tracking
//!
//! Positions are 1-based. Columns count chars, not bytes, so a token that follows
//! `é` on the same line sits one column further right, not two.

use serde::Serialize;
use std::fmt;

/// Represents a position in source text (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Moves past `text`, which was just consumed from the input.
    ///
    /// Text without line feeds only shifts the column. Otherwise the line advances by the
    /// number of line feeds and the column restarts from the char distance since the last
    /// one.
    pub fn advance(&mut self, text: &str) {
        if text.is_ascii() && !text.contains('\n') {
            self.column += text.len();
            return;
        }
        match text.rfind('\n') {
            None => self.column += text.chars().count(),
            Some(last) => {
                self.line += text.bytes().filter(|&b| b == b'\n').count();
                // Counting from the line feed itself makes the column 1-based.
                self.column = text[last..].chars().count();
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
