//! Emitting tokens back to CSS text
//!
//! This module turns normalized tokens back into source text. It is the inverse of
//! [RawToken::normalize](super::RawToken::normalize): markers and quotes are put back and
//! the value is re-escaped, so that scanning the output yields a token of the same kind
//! with the same value. The output is lexically equivalent to the scanned source, not
//! byte-identical: strings always come out double-quoted, URIs as `url("...")`, and
//! escapes are written in whichever form reads back unambiguously.
//!
//! This is useful for:
//!
//! - Round-trip testing (source -> tokens -> source)
//! - Token-level rewriting that has to produce valid CSS
//! - Debugging and visualization of token streams

use super::core::Token;
use super::escape::{escape_ident, escape_name, escape_string};
use super::kind::TokenKind;
use std::borrow::Cow;
use std::io::{self, Write};
use thiserror::Error;

/// Failure to emit a token.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Error and end-of-input tokens have no surface syntax.
    #[error("can not emit {0} token")]
    Unemittable(TokenKind),

    /// The sink refused the write.
    #[error("failed to write token: {0}")]
    Io(#[from] io::Error),
}

impl Token {
    /// Writes the CSS text for this token to `sink`.
    ///
    /// Emission makes several small writes; wrap unbuffered sinks in a `BufWriter`.
    pub fn emit<W: Write + ?Sized>(&self, sink: &mut W) -> Result<(), EmitError> {
        let (prefix, body, suffix) = self.css_parts()?;
        sink.write_all(prefix.as_bytes())?;
        sink.write_all(body.as_bytes())?;
        sink.write_all(suffix.as_bytes())?;
        Ok(())
    }

    fn css_parts(&self) -> Result<(&'static str, Cow<'_, str>, &'static str), EmitError> {
        let value = self.value.as_str();
        let parts = match self.kind {
            TokenKind::Error | TokenKind::Eof => return Err(EmitError::Unemittable(self.kind)),
            TokenKind::Ident => ("", escape_ident(value).into(), ""),
            TokenKind::AtKeyword => ("@", escape_ident(value).into(), ""),
            TokenKind::Hash => ("#", escape_name(value).into(), ""),
            TokenKind::Function => ("", escape_ident(value).into(), "("),
            TokenKind::String => ("\"", escape_string(value, '"').into(), "\""),
            TokenKind::Uri => ("url(\"", escape_string(value, '"').into(), "\")"),
            TokenKind::Dimension => {
                let (number, unit) = split_dimension(value);
                ("", format!("{}{}", number, escape_ident(unit)).into(), "")
            }
            TokenKind::Percentage => ("", value.into(), "%"),
            TokenKind::Comment => ("/*", value.into(), "*/"),
            TokenKind::Cdo => ("<!--", "".into(), ""),
            TokenKind::Cdc => ("-->", "".into(), ""),
            TokenKind::Includes => ("~=", "".into(), ""),
            TokenKind::DashMatch => ("|=", "".into(), ""),
            TokenKind::PrefixMatch => ("^=", "".into(), ""),
            TokenKind::SuffixMatch => ("$=", "".into(), ""),
            TokenKind::SubstringMatch => ("*=", "".into(), ""),
            TokenKind::Bom => ("\u{FEFF}", "".into(), ""),
            TokenKind::Number | TokenKind::UnicodeRange | TokenKind::Whitespace | TokenKind::Delim => {
                ("", value.into(), "")
            }
        };
        Ok(parts)
    }
}

/// Trait for converting a token to its CSS text
pub trait ToCssString {
    fn to_css_string(&self) -> Result<String, EmitError>;
}

impl ToCssString for Token {
    fn to_css_string(&self) -> Result<String, EmitError> {
        let (prefix, body, suffix) = self.css_parts()?;
        Ok([prefix, body.as_ref(), suffix].concat())
    }
}

/// Detokenize a stream of tokens into CSS text
///
/// Tokens are emitted back to back, so the stream should keep its whitespace and
/// delimiter tokens for the output to scan the same way. A trailing end-of-input token is
/// ignored; any other terminal token is an error.
pub fn detokenize(tokens: &[Token]) -> Result<String, EmitError> {
    let tokens = match tokens.split_last() {
        Some((last, rest)) if last.kind == TokenKind::Eof => rest,
        _ => tokens,
    };

    let mut result = String::new();
    for token in tokens {
        result.push_str(&token.to_css_string()?);
    }
    Ok(result)
}

/// Splits a dimension value into its number and its unit.
///
/// Escapes in the unit may have decoded into digits or a dot, which would fold into the
/// number when read back. In that case the split moves left so the unit keeps at least
/// one char, which then gets escaped.
fn split_dimension(value: &str) -> (&str, &str) {
    let number = number_prefix_len(value);
    let at = if number > 0 && number < value.len() {
        number
    } else if value.starts_with('.') && value.len() > 2 {
        2
    } else if value.starts_with(|c: char| c.is_ascii_digit()) && value.len() > 1 {
        1
    } else {
        value.len()
    };
    value.split_at(at)
}

/// Length of the leading `[0-9]*\.[0-9]+|[0-9]+` match.
fn number_prefix_len(value: &str) -> usize {
    let bytes = value.as_bytes();
    let integer = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if bytes.get(integer) == Some(&b'.') {
        let fraction = bytes[integer + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if fraction > 0 {
            return integer + 1 + fraction;
        }
    }
    integer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::token::Position;
    use rstest::rstest;

    fn token(kind: TokenKind, value: &str) -> Token {
        Token::new(kind, value, Position::default())
    }

    fn emitted(kind: TokenKind, value: &str) -> String {
        token(kind, value).to_css_string().unwrap()
    }

    #[rstest]
    #[case(TokenKind::Ident, "color", "color")]
    #[case(TokenKind::AtKeyword, "media", "@media")]
    #[case(TokenKind::Hash, "fff", "#fff")]
    #[case(TokenKind::Function, "rgb", "rgb(")]
    #[case(TokenKind::String, "abcd", "\"abcd\"")]
    #[case(TokenKind::Uri, "/pic.png", "url(\"/pic.png\")")]
    #[case(TokenKind::Number, "4.2", "4.2")]
    #[case(TokenKind::Percentage, "42", "42%")]
    #[case(TokenKind::Dimension, "42px", "42px")]
    #[case(TokenKind::Comment, " foo ", "/* foo */")]
    #[case(TokenKind::Cdo, "", "<!--")]
    #[case(TokenKind::Cdc, "", "-->")]
    #[case(TokenKind::Includes, "", "~=")]
    #[case(TokenKind::DashMatch, "", "|=")]
    #[case(TokenKind::PrefixMatch, "", "^=")]
    #[case(TokenKind::SuffixMatch, "", "$=")]
    #[case(TokenKind::SubstringMatch, "", "*=")]
    #[case(TokenKind::Delim, "{", "{")]
    #[case(TokenKind::Whitespace, " \n", " \n")]
    #[case(TokenKind::UnicodeRange, "U+0042", "U+0042")]
    #[case(TokenKind::Bom, "\u{FEFF}", "\u{FEFF}")]
    fn test_emit(#[case] kind: TokenKind, #[case] value: &str, #[case] expected: &str) {
        assert_eq!(emitted(kind, value), expected);
    }

    #[test]
    fn test_emit_escapes() {
        insta::assert_snapshot!(emitted(TokenKind::Ident, "B&W?"), @r"B\&W\?");
        insta::assert_snapshot!(emitted(TokenKind::String, "say \"hi\""), @r#""say\ \22 hi\22 ""#);
        insta::assert_snapshot!(emitted(TokenKind::String, "a\\\"b"), @r#""a\\\22 b""#);
        insta::assert_snapshot!(emitted(TokenKind::Uri, "a'b"), @r#"url("a'b")"#);
        assert_eq!(emitted(TokenKind::Dimension, "12"), "1\\32 ");
        assert_eq!(emitted(TokenKind::Dimension, "1.5"), "1\\.\\35 ");
    }

    #[rstest]
    #[case(TokenKind::Error)]
    #[case(TokenKind::Eof)]
    fn test_terminal_tokens_are_unemittable(#[case] kind: TokenKind) {
        let mut sink = Vec::new();
        let err = token(kind, "unclosed comment").emit(&mut sink).unwrap_err();
        assert!(matches!(err, EmitError::Unemittable(k) if k == kind));
        assert!(sink.is_empty());
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_passes_through() {
        let err = token(TokenKind::Ident, "a").emit(&mut FailingSink).unwrap_err();
        match err {
            EmitError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_emit_writes_to_sink() {
        let mut sink = Vec::new();
        token(TokenKind::AtKeyword, "import").emit(&mut sink).unwrap();
        assert_eq!(sink, b"@import");
    }

    #[rstest]
    #[case("42px", ("42", "px"))]
    #[case("1.5em", ("1.5", "em"))]
    #[case(".5em", (".5", "em"))]
    #[case("12", ("1", "2"))]
    #[case("1.5", ("1", ".5"))]
    #[case(".52", (".5", "2"))]
    fn test_split_dimension(#[case] value: &str, #[case] expected: (&str, &str)) {
        assert_eq!(split_dimension(value), expected);
    }

    #[test]
    fn test_detokenize() {
        let tokens = vec![
            token(TokenKind::Ident, "color"),
            token(TokenKind::Delim, ":"),
            token(TokenKind::Whitespace, " "),
            token(TokenKind::Hash, "fff"),
            token(TokenKind::Eof, ""),
        ];
        assert_eq!(detokenize(&tokens).unwrap(), "color: #fff");
    }

    #[test]
    fn test_detokenize_rejects_error_tokens() {
        let tokens = vec![
            token(TokenKind::Ident, "a"),
            token(TokenKind::Error, "unclosed quotation mark"),
        ];
        assert!(matches!(
            detokenize(&tokens),
            Err(EmitError::Unemittable(TokenKind::Error))
        ));
    }
}
