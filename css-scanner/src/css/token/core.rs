//! Raw and normalized token records
//!
//!     A [RawToken] is what the scanner hands out: the category, the lexeme exactly as it
//!     was consumed and where it started. [RawToken::normalize] strips the lexical
//!     decoration of the category (quotes, `@`, `#`, `(`, `%`, comment markers, the `url(`
//!     wrapper) and decodes escapes, producing a [Token].

use super::escape::{is_whitespace, unbackslash};
use super::kind::TokenKind;
use super::position::Position;
use serde::Serialize;
use std::fmt;

/// A token as scanned, before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawToken {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

/// A token carrying its canonical, decoded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: Position,
}

impl RawToken {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// Decodes the lexeme into the value the author meant.
    ///
    /// Consumes the raw token: decoding twice would strip real characters.
    pub fn normalize(self) -> Token {
        let value = normalize_lexeme(self.kind, &self.lexeme).unwrap_or(self.lexeme);
        Token {
            kind: self.kind,
            value,
            position: self.position,
        }
    }
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}

/// Returns the decoded value, or `None` when the lexeme is already the value.
fn normalize_lexeme(kind: TokenKind, lexeme: &str) -> Option<String> {
    let value = match kind {
        TokenKind::Ident | TokenKind::Dimension => unbackslash(lexeme, false).into_owned(),
        TokenKind::AtKeyword => unbackslash(strip_prefix(lexeme, '@'), false).into_owned(),
        TokenKind::Hash => unbackslash(strip_prefix(lexeme, '#'), false).into_owned(),
        TokenKind::Function => unbackslash(strip_suffix(lexeme, '('), false).into_owned(),
        TokenKind::String => unbackslash(strip_quotes(lexeme), true).into_owned(),
        TokenKind::Percentage => strip_suffix(lexeme, '%').to_owned(),
        TokenKind::Comment => lexeme
            .strip_prefix("/*")
            .and_then(|rest| rest.strip_suffix("*/"))
            .unwrap_or(lexeme)
            .to_owned(),
        TokenKind::Uri => normalize_uri(lexeme),
        TokenKind::Cdo
        | TokenKind::Cdc
        | TokenKind::Includes
        | TokenKind::DashMatch
        | TokenKind::PrefixMatch
        | TokenKind::SuffixMatch
        | TokenKind::SubstringMatch => String::new(),
        TokenKind::Number
        | TokenKind::UnicodeRange
        | TokenKind::Whitespace
        | TokenKind::Delim
        | TokenKind::Bom
        | TokenKind::Error
        | TokenKind::Eof => return None,
    };
    Some(value)
}

/// Only `url(` in any case followed directly by the paren is a URI, and the scanner
/// guarantees the closing paren.
fn normalize_uri(lexeme: &str) -> String {
    let interior = lexeme
        .get(4..lexeme.len().saturating_sub(1))
        .unwrap_or_default();
    let trimmed = interior.trim_matches(is_whitespace);
    if trimmed.is_empty() {
        return String::new();
    }
    let unquoted = if trimmed.len() >= 2
        && ((trimmed.starts_with('\'') && trimmed.ends_with('\''))
            || (trimmed.starts_with('"') && trimmed.ends_with('"')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    unbackslash(unquoted, false).into_owned()
}

fn strip_prefix(lexeme: &str, marker: char) -> &str {
    lexeme.strip_prefix(marker).unwrap_or(lexeme)
}

fn strip_suffix(lexeme: &str, marker: char) -> &str {
    lexeme.strip_suffix(marker).unwrap_or(lexeme)
}

/// Strips one pair of matching quotes. A lexeme without them is left as-is.
fn strip_quotes(lexeme: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| lexeme.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(lexeme)
}

fn write_summary(
    f: &mut fmt::Formatter<'_>,
    kind: TokenKind,
    position: Position,
    text: &str,
) -> fmt::Result {
    write!(
        f,
        "{} (line: {}, column: {}): ",
        kind, position.line, position.column
    )?;
    match text.char_indices().nth(10) {
        Some((cut, _)) => write!(f, "{:?}...", &text[..cut]),
        None => write!(f, "{:?}", text),
    }
}

impl fmt::Display for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, self.kind, self.position, &self.lexeme)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, self.kind, self.position, &self.value)
    }
}
