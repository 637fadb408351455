//! Backslash escapes
//!
//!     Decoding follows CSS 2.1 §4.1.3: a backslash followed by one to six hex digits
//!     stands for that code point (one whitespace char after a short run is swallowed),
//!     a backslash followed by anything else stands for that char, and inside strings a
//!     backslash before a line break is a line continuation that contributes nothing.
//!
//!     Encoding is the inverse used when emitting tokens. A char is written as `\c` when
//!     that reads back as `c`, and as a hex escape terminated by a space when it would not
//!     (hex digits, control chars, and chars the grammar does not allow after a
//!     backslash). Inside strings the delimiting quote is always written in hex: the
//!     string production also takes a backslash as a plain char, so `\"` would close the
//!     string.

use std::borrow::Cow;

/// Decodes backslash escapes in `s`.
///
/// `string_mode` enables the line-continuation rules that only apply inside quoted
/// strings. Input without a backslash is returned as-is, without allocating.
pub fn unbackslash(s: &str, string_mode: bool) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(c) = chars.next() else {
            // A trailing backslash stays.
            out.push('\\');
            break;
        };

        if string_mode {
            match c {
                '\n' => continue,
                '\r' => {
                    if chars.peek().is_none() {
                        out.push('\\');
                        break;
                    }
                    // CR LF is one line break; a CR on its own is dropped and whatever
                    // follows it is read normally.
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    continue;
                }
                _ => {}
            }
        }

        match c.to_digit(16) {
            Some(digit) => {
                let mut code = digit;
                let mut digits = 1;
                while digits < 6 {
                    match chars.peek().copied() {
                        Some(next) if next.is_ascii_hexdigit() => {
                            code = code * 16 + next.to_digit(16).unwrap_or(0);
                            digits += 1;
                            chars.next();
                        }
                        Some(next) if is_whitespace(next) => {
                            chars.next();
                            break;
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            None => out.push(c),
        }
    }

    Cow::Owned(out)
}

/// Escapes an identifier so that it scans back as a single IDENT with the same value.
///
/// Only `[a-zA-Z_-]` and non-ASCII chars above U+00FF are written as-is. A leading `-`
/// must be followed by a name-start char, so a lone `-` and the second of two leading
/// dashes are escaped too, as is a leading U+FEFF.
pub fn escape_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut leading_dash = false;

    for (i, c) in s.chars().enumerate() {
        match c {
            'a'..='z' | 'A'..='Z' | '_' => out.push(c),
            '-' if i == 0 && s.len() > 1 => {
                leading_dash = true;
                out.push(c);
            }
            '-' if i == 1 && leading_dash => push_escaped(&mut out, c),
            '-' if i > 0 => out.push(c),
            // Read back as a byte-order mark at the start of the input.
            '\u{FEFF}' if i == 0 => push_escaped(&mut out, c),
            c if c > '\u{FF}' && is_nonascii(c) => out.push(c),
            c => push_escaped(&mut out, c),
        }
    }

    out
}

/// Escapes the body of a HASH token. Names have no start restriction, so digits and
/// dashes pass through anywhere.
pub fn escape_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);

    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => out.push(c),
            c if c > '\u{FF}' && is_nonascii(c) => out.push(c),
            c => push_escaped(&mut out, c),
        }
    }

    out
}

/// Escapes the contents of a string delimited by `quote`.
///
/// The quote itself (always in hex form), backslashes, and every char below `#` except
/// tab and `!` are escaped. Everything else is written as-is.
pub fn escape_string(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len() + 8);

    for c in s.chars() {
        match c {
            c if c == quote => push_hex(&mut out, c),
            '\\' => out.push_str("\\\\"),
            '\t' | '!' => out.push(c),
            c if c >= '#' && (c <= '~' || is_nonascii(c)) => out.push(c),
            c => push_escaped(&mut out, c),
        }
    }

    out
}

fn push_escaped(out: &mut String, c: char) {
    if needs_hex_escape(c) {
        push_hex(out, c);
    } else {
        out.push('\\');
        out.push(c);
    }
}

fn push_hex(out: &mut String, c: char) {
    out.push_str(&format!("\\{:x} ", u32::from(c)));
}

/// `\c` reads back as `c` only for printable ASCII and non-ASCII chars, and never for hex
/// digits, which start a code point escape instead.
fn needs_hex_escape(c: char) -> bool {
    c.is_ascii_hexdigit() || !((' '..='~').contains(&c) || is_nonascii(c))
}

/// The grammar's `nonascii` class: U+0080 and above, minus the two noncharacters at the
/// end of the BMP.
pub(crate) fn is_nonascii(c: char) -> bool {
    c >= '\u{80}' && c != '\u{FFFE}' && c != '\u{FFFF}'
}

pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{0C}')
}
