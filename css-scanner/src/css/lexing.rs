//! Lexer
//!
//!     This module turns CSS source text into a flat stream of tokens. Scanning is a
//!     single pass: the [Scanner] looks at the first byte of the remaining input and
//!     either resolves the token right away or falls back to the regex productions of the
//!     [grammar](grammar), tried in a fixed order.
//!
//! Raw and Normalized Tokens
//!
//!     The scanner hands out [RawToken]s whose lexeme is exactly the consumed text. This
//!     is what position tracking and error reporting work on. Consumers that care about
//!     values rather than spelling call [RawToken::normalize], which strips markers and
//!     decodes escapes. [tokenize] does both in one go.
//!
//! Errors
//!
//!     Only two conditions stop a scan: a string that is never closed and a comment that
//!     is never closed. The scanner reports them as a terminal error token, and
//!     [ScanError] is the same condition for callers that prefer a `Result`. Everything
//!     else, including stray backslashes and chars no production accepts, scans as some
//!     token.

pub mod grammar;
pub mod scanner;

pub use grammar::{GrammarError, ProductionTable, MATCH_ORDER};
pub use scanner::{ScanState, Scanner};

use crate::css::token::{Position, RawToken, Token, TokenKind};
use thiserror::Error;

/// Diagnostic carried by the error token of an unterminated string.
pub const UNCLOSED_QUOTE: &str = "unclosed quotation mark";
/// Diagnostic carried by the error token of an unterminated comment.
pub const UNCLOSED_COMMENT: &str = "unclosed comment";

/// A lexical error that ends the token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unclosed quotation mark at {position}")]
    UnclosedQuote { position: Position },

    #[error("unclosed comment at {position}")]
    UnclosedComment { position: Position },
}

impl ScanError {
    /// Where the offending string or comment starts.
    pub fn position(&self) -> Position {
        match self {
            ScanError::UnclosedQuote { position } | ScanError::UnclosedComment { position } => {
                *position
            }
        }
    }

    /// The text an error token carries for this error.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            ScanError::UnclosedQuote { .. } => UNCLOSED_QUOTE,
            ScanError::UnclosedComment { .. } => UNCLOSED_COMMENT,
        }
    }

    pub fn to_token(&self) -> RawToken {
        RawToken::new(TokenKind::Error, self.diagnostic(), self.position())
    }

    /// Recovers the error from an error token. Returns `None` for any other token.
    pub fn from_token(token: &RawToken) -> Option<Self> {
        if token.kind != TokenKind::Error {
            return None;
        }
        let position = token.position;
        match token.lexeme.as_str() {
            UNCLOSED_QUOTE => Some(ScanError::UnclosedQuote { position }),
            UNCLOSED_COMMENT => Some(ScanError::UnclosedComment { position }),
            _ => None,
        }
    }
}

/// Scans `source` and normalizes every token.
///
/// The end-of-input token is not included. Stops at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ScanError> {
    Scanner::new(source)
        .map(|scanned| scanned.map(RawToken::normalize))
        .collect()
}

/// Scans `source` without normalizing.
///
/// The result always ends with the terminal token, either end-of-input or an error.
pub fn tokenize_raw(source: &str) -> Vec<RawToken> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token();
        let terminal = token.kind.is_terminal();
        tokens.push(token);
        if terminal {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_normalizes() {
        let tokens = tokenize("@import url('a.css');").unwrap();
        let values: Vec<(TokenKind, &str)> = tokens
            .iter()
            .map(|t| (t.kind, t.value.as_str()))
            .collect();
        assert_eq!(
            values,
            vec![
                (TokenKind::AtKeyword, "import"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Uri, "a.css"),
                (TokenKind::Delim, ";"),
            ]
        );
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert_eq!(tokenize("").unwrap(), Vec::new());
    }

    #[test]
    fn test_tokenize_reports_unclosed_comment() {
        let err = tokenize("a {}\n/* never closed").unwrap_err();
        assert_eq!(
            err,
            ScanError::UnclosedComment {
                position: Position::new(2, 1)
            }
        );
        assert_eq!(err.to_string(), "unclosed comment at 2:1");
    }

    #[test]
    fn test_tokenize_raw_ends_with_terminal_token() {
        let tokens = tokenize_raw("a 'b");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Ident, TokenKind::Whitespace, TokenKind::Error]
        );
        assert_eq!(tokens[2].lexeme, UNCLOSED_QUOTE);

        let tokens = tokenize_raw("");
        assert_eq!(tokens, vec![RawToken::new(TokenKind::Eof, "", Position::default())]);
    }

    #[test]
    fn test_error_token_conversion() {
        let error = ScanError::UnclosedQuote {
            position: Position::new(4, 2),
        };
        let token = error.to_token();
        assert_eq!(token.kind, TokenKind::Error);
        assert_eq!(token.lexeme, "unclosed quotation mark");
        assert_eq!(ScanError::from_token(&token), Some(error));

        let ident = RawToken::new(TokenKind::Ident, UNCLOSED_QUOTE, Position::default());
        assert_eq!(ScanError::from_token(&ident), None);
    }
}
