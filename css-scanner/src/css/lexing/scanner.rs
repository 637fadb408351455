//! Scanner
//!
//!     A cursor over CSS source that produces one [RawToken] per call to
//!     [Scanner::next_token].
//!
//!     Most tokens are decided by their first byte: whitespace, punctuation, strings,
//!     comments, hashes, at-keywords and the two-char match operators never reach the
//!     regex fallback. Everything else is tried against the productions in
//!     [MATCH_ORDER], and whatever still matches nothing is emitted as a single-char
//!     DELIM. A byte-order mark is only recognized at the very start of the input.
//!
//! Terminal State
//!
//!     Reaching the end of input or an unterminated string or comment moves the scanner
//!     into a terminal [ScanState]. From then on every call returns the same terminal
//!     token; nothing is re-scanned.

use super::grammar::{ProductionTable, MATCH_ORDER};
use super::ScanError;
use crate::css::token::{Position, RawToken, TokenKind};
use std::sync::Arc;

/// Where the scanner is in its life cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    /// Input exhausted; holds the end-of-input token.
    Ended(RawToken),
    /// Unterminated string or comment; holds the error token.
    Errored(RawToken),
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanState::Scanning)
    }

    pub fn terminal_token(&self) -> Option<&RawToken> {
        match self {
            ScanState::Scanning => None,
            ScanState::Ended(token) | ScanState::Errored(token) => Some(token),
        }
    }
}

/// What the dispatch decided for the current position.
enum Step {
    /// Emit a token of this kind spanning this many bytes.
    Emit(TokenKind, usize),
    UnclosedQuote,
    UnclosedComment,
}

#[derive(Debug)]
pub struct Scanner {
    input: String,
    /// Byte offset into `input`.
    pos: usize,
    position: Position,
    state: ScanState,
    table: Arc<ProductionTable>,
}

impl Scanner {
    /// Creates a scanner over `input` backed by the shared production table.
    ///
    /// CRLF pairs are folded into LF before scanning.
    pub fn new(input: &str) -> Self {
        Self::with_table(input, ProductionTable::shared())
    }

    pub fn with_table(input: &str, table: Arc<ProductionTable>) -> Self {
        Self {
            input: input.replace("\r\n", "\n"),
            pos: 0,
            position: Position::default(),
            state: ScanState::Scanning,
            table,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Position of the next token to be produced.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Produces the next token.
    ///
    /// Returns an EOF token once the input is exhausted and an error token for an
    /// unterminated string or comment. Both are final: every later call returns the same
    /// token again.
    pub fn next_token(&mut self) -> RawToken {
        if let Some(token) = self.state.terminal_token() {
            return token.clone();
        }

        if self.pos >= self.input.len() {
            let token = RawToken::new(TokenKind::Eof, "", self.position);
            tracing::debug!(position = %self.position, "reached end of input");
            self.state = ScanState::Ended(token.clone());
            return token;
        }

        match self.step() {
            Step::Emit(kind, len) => self.emit(kind, len),
            Step::UnclosedQuote => self.fail(ScanError::UnclosedQuote {
                position: self.position,
            }),
            Step::UnclosedComment => self.fail(ScanError::UnclosedComment {
                position: self.position,
            }),
        }
    }

    fn step(&self) -> Step {
        let input = &self.input[self.pos..];
        let bytes = input.as_bytes();

        if self.pos == 0 && input.starts_with('\u{FEFF}') {
            return Step::Emit(TokenKind::Bom, '\u{FEFF}'.len_utf8());
        }

        match bytes[0] {
            b'\t' | b'\n' | b'\x0C' | b'\r' | b' ' => {
                return self.matched(TokenKind::Whitespace, input).unwrap_or(DELIM);
            }
            // A dot followed by a digit starts a number.
            b'.' if !matches!(bytes.get(1), Some(b) if b.is_ascii_digit()) => return DELIM,
            b'.' => {}
            b'#' => return self.matched(TokenKind::Hash, input).unwrap_or(DELIM),
            b'@' => return self.matched(TokenKind::AtKeyword, input).unwrap_or(DELIM),
            b':' | b',' | b';' | b'%' | b'&' | b'+' | b'=' | b'>' | b'(' | b')' | b'['
            | b']' | b'{' | b'}' => return DELIM,
            b'"' | b'\'' => {
                return self
                    .matched(TokenKind::String, input)
                    .unwrap_or(Step::UnclosedQuote);
            }
            b'/' if bytes.get(1) == Some(&b'*') => {
                return self
                    .matched(TokenKind::Comment, input)
                    .unwrap_or(Step::UnclosedComment);
            }
            b'/' => return DELIM,
            b'~' => return prefix_or_char(input, TokenKind::Includes, "~="),
            b'|' => return prefix_or_char(input, TokenKind::DashMatch, "|="),
            b'^' => return prefix_or_char(input, TokenKind::PrefixMatch, "^="),
            b'$' => return prefix_or_char(input, TokenKind::SuffixMatch, "$="),
            b'*' => return prefix_or_char(input, TokenKind::SubstringMatch, "*="),
            b'<' => return prefix_or_char(input, TokenKind::Cdo, "<!--"),
            _ => {}
        }

        MATCH_ORDER
            .iter()
            .find_map(|&kind| self.matched(kind, input))
            .unwrap_or_else(|| {
                // Strings and comments were settled above, so this is a lone char.
                let width = input.chars().next().map_or(1, char::len_utf8);
                Step::Emit(TokenKind::Delim, width)
            })
    }

    fn matched(&self, kind: TokenKind, input: &str) -> Option<Step> {
        self.table
            .find(kind, input)
            .map(|text| Step::Emit(kind, text.len()))
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> RawToken {
        let end = self.pos + len;
        let token = RawToken::new(kind, &self.input[self.pos..end], self.position);
        self.position.advance(&token.lexeme);
        self.pos = end;
        tracing::trace!(
            kind = %token.kind,
            line = token.line(),
            column = token.column(),
            lexeme = ?token.lexeme,
            "scanned token"
        );
        token
    }

    fn fail(&mut self, error: ScanError) -> RawToken {
        let token = error.to_token();
        tracing::debug!(%error, "scanning stopped");
        self.state = ScanState::Errored(token.clone());
        token
    }
}

/// A single ASCII char as DELIM.
const DELIM: Step = Step::Emit(TokenKind::Delim, 1);

fn prefix_or_char(input: &str, kind: TokenKind, prefix: &str) -> Step {
    if input.starts_with(prefix) {
        Step::Emit(kind, prefix.len())
    } else {
        DELIM
    }
}

/// Yields tokens up to the end of input. A lexical error is yielded once as `Err`, after
/// which the iterator is exhausted.
impl Iterator for Scanner {
    type Item = Result<RawToken, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_terminal() {
            return None;
        }
        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => None,
            TokenKind::Error => ScanError::from_token(&token).map(Err),
            _ => Some(Ok(token)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::lexing::UNCLOSED_QUOTE;

    fn scan(input: &str) -> Vec<(TokenKind, String)> {
        Scanner::new(input)
            .map(|t| t.map(|t| (t.kind, t.lexeme)))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn pair(kind: TokenKind, lexeme: &str) -> (TokenKind, String) {
        (kind, lexeme.to_string())
    }

    #[test]
    fn test_declaration_without_whitespace() {
        assert_eq!(
            scan("color:red"),
            vec![
                pair(TokenKind::Ident, "color"),
                pair(TokenKind::Delim, ":"),
                pair(TokenKind::Ident, "red"),
            ]
        );
    }

    #[test]
    fn test_ident_swallows_cdc_dashes() {
        assert_eq!(
            scan("red-->"),
            vec![pair(TokenKind::Ident, "red--"), pair(TokenKind::Delim, ">")]
        );
    }

    #[test]
    fn test_url_with_and_without_quotes() {
        for input in ["url(/pic.png)", "url('/pic.png')"] {
            let tokens: Vec<_> = Scanner::new(input).collect::<Result<_, _>>().unwrap();
            assert_eq!(tokens.len(), 1, "{input}");
            let token = tokens.into_iter().next().unwrap().normalize();
            assert_eq!(token.kind, TokenKind::Uri);
            assert_eq!(token.value, "/pic.png");
        }
    }

    #[test]
    fn test_unclosed_string_is_terminal() {
        let mut scanner = Scanner::new("\"abc");
        let first = scanner.next_token();
        assert_eq!(
            first,
            RawToken::new(TokenKind::Error, UNCLOSED_QUOTE, Position::new(1, 1))
        );
        assert!(matches!(scanner.state(), ScanState::Errored(_)));
        for _ in 0..3 {
            assert_eq!(scanner.next_token(), first);
        }
    }

    #[test]
    fn test_eof_is_terminal() {
        let mut scanner = Scanner::new("a");
        assert_eq!(scanner.next_token().kind, TokenKind::Ident);
        assert!(!scanner.is_terminal());
        let eof = scanner.next_token();
        assert_eq!(eof, RawToken::new(TokenKind::Eof, "", Position::new(1, 2)));
        assert_eq!(scanner.state(), &ScanState::Ended(eof.clone()));
        assert_eq!(scanner.next_token(), eof);
    }

    #[test]
    fn test_column_after_multiline_whitespace() {
        let mut scanner = Scanner::new("   \n   \t   \nfoo");
        let space = scanner.next_token();
        assert_eq!(space.kind, TokenKind::Whitespace);
        assert_eq!(space.lexeme, "   \n   \t   \n");
        let ident = scanner.next_token();
        assert_eq!(ident.position, Position::new(3, 1));
    }

    #[test]
    fn test_crlf_is_folded() {
        let mut scanner = Scanner::new("a\r\nb");
        assert_eq!(scanner.next_token().kind, TokenKind::Ident);
        assert_eq!(scanner.next_token().lexeme, "\n");
        assert_eq!(scanner.next_token().position, Position::new(2, 1));
    }

    #[test]
    fn test_bom_only_at_start() {
        let tokens = scan("\u{FEFF}a \u{FEFF}");
        assert_eq!(
            tokens,
            vec![
                pair(TokenKind::Bom, "\u{FEFF}"),
                pair(TokenKind::Ident, "a"),
                pair(TokenKind::Whitespace, " "),
                pair(TokenKind::Ident, "\u{FEFF}"),
            ]
        );
    }

    #[test]
    fn test_bom_and_catch_all_advance_one_column() {
        let mut scanner = Scanner::new("\u{FEFF}\u{FFFE}x");
        assert_eq!(scanner.next_token().kind, TokenKind::Bom);
        assert_eq!(scanner.position(), Position::new(1, 2));
        let delim = scanner.next_token();
        assert_eq!(delim.kind, TokenKind::Delim);
        assert_eq!(delim.lexeme, "\u{FFFE}");
        assert_eq!(scanner.position(), Position::new(1, 3));
    }

    #[test]
    fn test_dot_dispatch() {
        assert_eq!(
            scan(".a .5"),
            vec![
                pair(TokenKind::Delim, "."),
                pair(TokenKind::Ident, "a"),
                pair(TokenKind::Whitespace, " "),
                pair(TokenKind::Number, ".5"),
            ]
        );
        assert_eq!(scan("."), vec![pair(TokenKind::Delim, ".")]);
    }

    #[test]
    fn test_iterator_yields_error_once() {
        let mut scanner = Scanner::new("a /* b");
        assert!(matches!(scanner.next(), Some(Ok(_))));
        assert!(matches!(scanner.next(), Some(Ok(_))));
        assert_eq!(
            scanner.next(),
            Some(Err(ScanError::UnclosedComment {
                position: Position::new(1, 3)
            }))
        );
        assert_eq!(scanner.next(), None);
    }

    #[test]
    fn test_scanners_share_one_table() {
        let table = ProductionTable::shared();
        let mut first = Scanner::with_table("a", Arc::clone(&table));
        let mut second = Scanner::with_table("b", Arc::clone(&table));
        assert_eq!(first.next_token().lexeme, "a");
        assert_eq!(second.next_token().lexeme, "b");
    }
}
