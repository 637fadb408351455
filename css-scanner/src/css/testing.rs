//! Testing utilities for token stream assertions
//!
//!     Scanner tests compare token streams, and positions are almost never the point of
//!     such a test. The helpers here reduce a scan to `(kind, text)` pairs so a case table
//!     can list the expected stream compactly, and keep positions for the tests that do
//!     care.
//!
//!     The round-trip helpers check the emit law: a normalized token, emitted on its own
//!     and scanned again, comes back as a single token of the same kind with the same
//!     value.
//!
//!     ```rust,ignore
//!     use css_scanner::css::testing::{raw, scan_pairs};
//!     use css_scanner::css::TokenKind;
//!
//!     assert_eq!(
//!         scan_pairs("color:red"),
//!         vec![
//!             raw(TokenKind::Ident, "color"),
//!             raw(TokenKind::Delim, ":"),
//!             raw(TokenKind::Ident, "red"),
//!         ]
//!     );
//!     ```

use crate::css::lexing::{tokenize, tokenize_raw, Scanner};
use crate::css::token::{RawToken, ToCssString, Token, TokenKind};

/// Builds an expected `(kind, text)` pair.
pub fn raw(kind: TokenKind, text: &str) -> (TokenKind, String) {
    (kind, text.to_string())
}

/// Scans `source` into `(kind, lexeme)` pairs, without the end-of-input token.
///
/// Panics on a lexical error.
pub fn scan_pairs(source: &str) -> Vec<(TokenKind, String)> {
    Scanner::new(source)
        .map(|scanned| match scanned {
            Ok(token) => (token.kind, token.lexeme),
            Err(err) => panic!("scanning {source:?} failed: {err}"),
        })
        .collect()
}

/// Scans and normalizes `source` into `(kind, value)` pairs.
///
/// Panics on a lexical error.
pub fn value_pairs(source: &str) -> Vec<(TokenKind, String)> {
    match tokenize(source) {
        Ok(tokens) => tokens.into_iter().map(|t| (t.kind, t.value)).collect(),
        Err(err) => panic!("scanning {source:?} failed: {err}"),
    }
}

/// Categories of every token scanned from `source`, terminal token included.
pub fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize_raw(source).iter().map(|t| t.kind).collect()
}

/// Emits `token` and scans the result again.
///
/// Returns `None` for tokens that cannot be emitted. The rescan includes the terminal
/// token.
pub fn rescan(token: &Token) -> Option<Vec<RawToken>> {
    let text = token.to_css_string().ok()?;
    Some(tokenize_raw(&text))
}

/// Asserts that `token` survives emit and rescan with its kind and value.
pub fn assert_round_trip(token: &Token) {
    let Some(rescanned) = rescan(token) else {
        panic!("{token} can not be emitted");
    };
    let text = token.to_css_string().unwrap_or_default();
    match rescanned.as_slice() {
        [single, eof] if eof.kind == TokenKind::Eof => {
            let again = single.clone().normalize();
            assert_eq!(
                (again.kind, again.value.as_str()),
                (token.kind, token.value.as_str()),
                "emitted {text:?} for {token}"
            );
        }
        other => panic!("emitted {text:?} for {token}, which scans as {other:?}"),
    }
}
