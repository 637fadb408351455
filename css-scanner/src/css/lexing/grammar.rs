//! Grammar Production Definitions
//!
//! This module defines the token productions of the CSS3 syntax as regex rules, built
//! from a small set of macros (http://www.w3.org/TR/css3-syntax/#tokenization).
//!
//! # Expansion
//!
//! A production may reference macros as `{name}`. Expansion replaces every reference with
//! the macro body wrapped in a non-capturing group, and repeats until no reference is
//! left, since macro bodies reference other macros. The result is anchored at the start
//! so a match is only ever attempted at the scanner's current position.
//!
//! # Match Order
//!
//! Most tokens are recognized from their first byte by the scanner. For the rest, the
//! productions in [MATCH_ORDER] are tried in turn and the first match wins. Order matters
//! because some categories are textual prefixes of others: `42` is a NUMBER, `42%` a
//! PERCENTAGE and `42px` a DIMENSION, and `url(` is a FUNCTION unless the whole URI
//! matches.

use crate::css::token::TokenKind;
use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Matches a macro reference such as `{nmstart}`.
static MACRO_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z]+)\}").expect("macro reference pattern is valid"));

/// The table every scanner uses unless it is given its own.
static SHARED_TABLE: Lazy<Arc<ProductionTable>> = Lazy::new(|| {
    Arc::new(ProductionTable::compile().expect("built-in CSS productions compile"))
});

/// Macros as `(name, pattern)`. In patterns, `\.+*?()|[]{}^$` must be escaped.
pub(crate) const MACROS: &[(&str, &str)] = &[
    ("ident", r"-?{nmstart}{nmchar}*"),
    ("name", r"{nmchar}+"),
    ("nmstart", r"[a-zA-Z_]|{nonascii}|{escape}"),
    (
        "nonascii",
        r"[\x{80}-\x{D7FF}\x{E000}-\x{FFFD}\x{10000}-\x{10FFFF}]",
    ),
    ("unicode", r"\\[0-9a-fA-F]{1,6}{wc}?"),
    (
        "escape",
        r"{unicode}|\\[\x{20}-\x{7E}\x{80}-\x{D7FF}\x{E000}-\x{FFFD}\x{10000}-\x{10FFFF}]",
    ),
    ("nmchar", r"[a-zA-Z0-9_-]|{nonascii}|{escape}"),
    ("num", r"[0-9]*\.[0-9]+|[0-9]+"),
    ("string", r#""(?:{stringchar}|')*"|'(?:{stringchar}|")*'"#),
    ("stringchar", r"{urlchar}|[ ]|\\{nl}"),
    ("urlchar", r"[\x09\x21\x23-\x26\x27-\x7E]|{nonascii}|{escape}"),
    ("nl", r"[\n\r\f]|\r\n"),
    ("w", r"{wc}*"),
    ("wc", r"[\t\n\f\r ]"),
];

/// Productions as `(kind, pattern)`.
///
/// CDO, the match operators, DELIM and BOM are recognized by the scanner directly and
/// have no production.
pub(crate) const PRODUCTIONS: &[(TokenKind, &str)] = &[
    (TokenKind::Ident, r"{ident}"),
    (TokenKind::AtKeyword, r"@{ident}"),
    (TokenKind::String, r"{string}"),
    (TokenKind::Hash, r"#{name}"),
    (TokenKind::Number, r"{num}"),
    (TokenKind::Percentage, r"{num}%"),
    (TokenKind::Dimension, r"{num}{ident}"),
    (
        TokenKind::Uri,
        r"[Uu][Rr][Ll]\({w}(?:{string}|{urlchar}*){w}\)",
    ),
    (
        TokenKind::UnicodeRange,
        r"[Uu]\+[0-9A-F\?]{1,6}(?:-[0-9A-F]{1,6})?",
    ),
    (TokenKind::Cdc, r"-->"),
    (TokenKind::Whitespace, r"{wc}+"),
    (TokenKind::Comment, r"/\*[^\*]*[\*]+(?:[^/][^\*]*[\*]+)*/"),
    (TokenKind::Function, r"{ident}\("),
];

/// Order in which productions are tried when the first byte decides nothing.
pub const MATCH_ORDER: &[TokenKind] = &[
    TokenKind::Uri,
    TokenKind::Function,
    TokenKind::UnicodeRange,
    TokenKind::Ident,
    TokenKind::Dimension,
    TokenKind::Percentage,
    TokenKind::Number,
    TokenKind::Cdc,
];

/// Macros nest a handful of levels deep; anything past this is a cycle.
const MAX_EXPANSION_DEPTH: usize = 16;

/// The nonascii classes expand into large UTF-8 automata.
const REGEX_SIZE_LIMIT: usize = 32 * (1 << 20);

/// Errors raised while building the production table.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("production references unknown macro `{{{0}}}`")]
    UnknownMacro(String),

    #[error("macro expansion does not terminate: {0}")]
    MacroDepthExceeded(String),

    #[error("production for {kind} does not compile: {source}")]
    Regex {
        kind: TokenKind,
        #[source]
        source: regex::Error,
    },
}

fn macro_body(name: &str) -> Option<&'static str> {
    MACROS
        .iter()
        .find(|(macro_name, _)| *macro_name == name)
        .map(|(_, body)| *body)
}

/// Expands every macro reference in `pattern`, recursively.
pub fn expand(pattern: &str) -> Result<String, GrammarError> {
    let mut expanded = pattern.to_string();

    for _ in 0..MAX_EXPANSION_DEPTH {
        if !MACRO_REFERENCE.is_match(&expanded) {
            return Ok(expanded);
        }
        if let Some(unknown) = MACRO_REFERENCE
            .captures_iter(&expanded)
            .map(|caps| caps[1].to_string())
            .find(|name| macro_body(name).is_none())
        {
            return Err(GrammarError::UnknownMacro(unknown));
        }
        expanded = MACRO_REFERENCE
            .replace_all(&expanded, |caps: &Captures| {
                format!("(?:{})", macro_body(&caps[1]).unwrap_or_default())
            })
            .into_owned();
    }

    if MACRO_REFERENCE.is_match(&expanded) {
        Err(GrammarError::MacroDepthExceeded(pattern.to_string()))
    } else {
        Ok(expanded)
    }
}

/// Compiled, anchored matchers for every production.
///
/// Read-only once built, so one table can back any number of scanners, on any number of
/// threads.
#[derive(Debug, Clone)]
pub struct ProductionTable {
    matchers: HashMap<TokenKind, Regex>,
}

impl ProductionTable {
    /// Expands and compiles the built-in productions.
    pub fn compile() -> Result<Self, GrammarError> {
        let mut matchers = HashMap::with_capacity(PRODUCTIONS.len());
        for &(kind, production) in PRODUCTIONS {
            let pattern = format!("^(?:{})", expand(production)?);
            let regex = RegexBuilder::new(&pattern)
                .size_limit(REGEX_SIZE_LIMIT)
                .build()
                .map_err(|source| GrammarError::Regex { kind, source })?;
            matchers.insert(kind, regex);
        }
        tracing::debug!(productions = matchers.len(), "compiled CSS production table");
        Ok(Self { matchers })
    }

    /// The process-wide table, compiled on first use.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_TABLE)
    }

    pub fn matcher(&self, kind: TokenKind) -> Option<&Regex> {
        self.matchers.get(&kind)
    }

    /// The text at the start of `input` matched by the production for `kind`.
    ///
    /// Returns `None` when the production does not match or matches only the empty
    /// string, and for categories without a production.
    pub fn find<'s>(&self, kind: TokenKind, input: &'s str) -> Option<&'s str> {
        self.matchers
            .get(&kind)?
            .find(input)
            .map(|m| m.as_str())
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_expand_resolves_nested_macros() {
        let expanded = expand("{w}").unwrap();
        assert_eq!(expanded, r"(?:(?:[\t\n\f\r ])*)");
    }

    #[test]
    fn test_expand_leaves_quantifiers_alone() {
        let expanded = expand(r"[0-9A-F\?]{1,6}").unwrap();
        assert_eq!(expanded, r"[0-9A-F\?]{1,6}");
    }

    #[test]
    fn test_expand_rejects_unknown_macro() {
        let err = expand("{nope}").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownMacro(name) if name == "nope"));
    }

    #[test]
    fn test_every_production_is_compiled() {
        let table = ProductionTable::compile().unwrap();
        for &(kind, _) in PRODUCTIONS {
            assert!(table.matcher(kind).is_some(), "missing matcher for {kind}");
        }
        for kind in MATCH_ORDER {
            assert!(table.matcher(*kind).is_some(), "missing matcher for {kind}");
        }
        assert!(table.matcher(TokenKind::Delim).is_none());
    }

    #[test]
    fn test_shared_table_is_reused() {
        assert!(Arc::ptr_eq(&ProductionTable::shared(), &ProductionTable::shared()));
    }

    #[rstest]
    #[case(TokenKind::Ident, "red-->", Some("red--"))]
    #[case(TokenKind::Ident, "-moz-border:1", Some("-moz-border"))]
    #[case(TokenKind::Ident, "42px", None)]
    #[case(TokenKind::Number, "4.2.1", Some("4.2"))]
    #[case(TokenKind::Number, ".42%", Some(".42"))]
    #[case(TokenKind::Dimension, "42px;", Some("42px"))]
    #[case(TokenKind::Percentage, "42%", Some("42%"))]
    #[case(TokenKind::String, "\"abc\" x", Some("\"abc\""))]
    #[case(TokenKind::String, "\"abc", None)]
    #[case(TokenKind::String, "'a\\\nb'", Some("'a\\\nb'"))]
    #[case(TokenKind::Comment, "/* a * b */ c", Some("/* a * b */"))]
    #[case(TokenKind::Comment, "/* a", None)]
    #[case(TokenKind::Uri, "url( 'x' ) y", Some("url( 'x' )"))]
    #[case(TokenKind::Uri, "url(a b)", None)]
    #[case(TokenKind::Function, "url(a b)", Some("url("))]
    #[case(TokenKind::UnicodeRange, "U+0-7F", Some("U+0-7F"))]
    #[case(TokenKind::Hash, "#fff", Some("#fff"))]
    #[case(TokenKind::Hash, "# ", None)]
    #[case(TokenKind::Whitespace, "   \n   \t   \nx", Some("   \n   \t   \n"))]
    #[case(TokenKind::Delim, ";", None)]
    fn test_find(#[case] kind: TokenKind, #[case] input: &str, #[case] expected: Option<&str>) {
        let table = ProductionTable::shared();
        assert_eq!(table.find(kind, input), expected);
    }

    #[test]
    fn test_matches_are_anchored() {
        let table = ProductionTable::shared();
        assert_eq!(table.find(TokenKind::Number, "px42"), None);
    }
}
