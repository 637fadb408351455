//! Token categories
//!
//!     The complete, closed list of CSS3 token categories plus the two scanner flags
//!     (`Error` and `Eof`). Names are the ones used by the CSS 2.1/3 syntax tables and are
//!     only meant for diagnostics and serialized output.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    // Scanner flags
    Error,
    Eof,
    // CSS tokens
    Ident,
    AtKeyword,
    String,
    Hash,
    Number,
    Percentage,
    Dimension,
    Uri,
    UnicodeRange,
    /// `<!--`
    Cdo,
    /// `-->`
    Cdc,
    Whitespace,
    Comment,
    Function,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// A single significant character.
    Delim,
    /// Byte-order mark, only ever recognized at the start of the input.
    Bom,
}

impl TokenKind {
    /// Every category, in declaration order.
    pub const ALL: [TokenKind; 23] = [
        TokenKind::Error,
        TokenKind::Eof,
        TokenKind::Ident,
        TokenKind::AtKeyword,
        TokenKind::String,
        TokenKind::Hash,
        TokenKind::Number,
        TokenKind::Percentage,
        TokenKind::Dimension,
        TokenKind::Uri,
        TokenKind::UnicodeRange,
        TokenKind::Cdo,
        TokenKind::Cdc,
        TokenKind::Whitespace,
        TokenKind::Comment,
        TokenKind::Function,
        TokenKind::Includes,
        TokenKind::DashMatch,
        TokenKind::PrefixMatch,
        TokenKind::SuffixMatch,
        TokenKind::SubstringMatch,
        TokenKind::Delim,
        TokenKind::Bom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Error => "error",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::AtKeyword => "ATKEYWORD",
            TokenKind::String => "STRING",
            TokenKind::Hash => "HASH",
            TokenKind::Number => "NUMBER",
            TokenKind::Percentage => "PERCENTAGE",
            TokenKind::Dimension => "DIMENSION",
            TokenKind::Uri => "URI",
            TokenKind::UnicodeRange => "UNICODE-RANGE",
            TokenKind::Cdo => "CDO",
            TokenKind::Cdc => "CDC",
            TokenKind::Whitespace => "S",
            TokenKind::Comment => "COMMENT",
            TokenKind::Function => "FUNCTION",
            TokenKind::Includes => "INCLUDES",
            TokenKind::DashMatch => "DASHMATCH",
            TokenKind::PrefixMatch => "PREFIXMATCH",
            TokenKind::SuffixMatch => "SUFFIXMATCH",
            TokenKind::SubstringMatch => "SUBSTRINGMATCH",
            TokenKind::Delim => "DELIM",
            TokenKind::Bom => "BOM",
        }
    }

    /// End of input and lexical errors stop the scanner for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, TokenKind::Error | TokenKind::Eof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = TokenKind::ALL.iter().map(|kind| kind.name()).collect();
        assert_eq!(names.len(), TokenKind::ALL.len());
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(TokenKind::DashMatch.to_string(), "DASHMATCH");
        assert_eq!(TokenKind::UnicodeRange.to_string(), "UNICODE-RANGE");
        assert_eq!(TokenKind::Whitespace.to_string(), "S");
    }

    #[test]
    fn test_only_flags_are_terminal() {
        let terminal: Vec<_> = TokenKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.is_terminal())
            .collect();
        assert_eq!(terminal, vec![TokenKind::Error, TokenKind::Eof]);
    }
}
