//! # css-scanner
//!
//! A lexical scanner for CSS3 source text.
//!
//! File Layout
//!
//! The library is split the same way the tokenization itself is split:
//! src/css
//!   ├── token      Token categories, raw and normalized token records, escape
//!   │              decoding and the inverse re-escaping used when emitting CSS
//!   ├── lexing     The production grammar and the scanner state machine
//!   └── testing    Helpers shared by unit and integration tests
//!
//! The scanner hands out [RawToken](css::token::RawToken)s carrying the lexeme as
//! it appeared in the source. Calling `normalize` on one consumes it and yields a
//! [Token](css::token::Token) holding the decoded value, which can be written back
//! out as legal CSS with `emit`.

pub mod css;
