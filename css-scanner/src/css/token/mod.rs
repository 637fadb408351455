//! Token types and helpers shared by the scanner and its consumers.
//!
//! Token Layers
//!
//!     Raw Tokens:
//!         Produced by the [scanner](crate::css::lexing::Scanner). A [RawToken] carries the
//!         lexeme exactly as it was consumed from the source, escapes, quotes and markers
//!         included.
//!
//!     Normalized Tokens:
//!         A [Token] holds the canonical value the author meant: `@media` becomes `media`,
//!         `"a\"b"` becomes `a"b`, `url( 'x.png' )` becomes `x.png`. The only way to get one
//!         is [RawToken::normalize], which consumes the raw token. Decoding is not
//!         idempotent (stripping quotes twice eats real characters), so keeping the two
//!         forms apart at the type level makes double normalization impossible.
//!
//!     Emitting:
//!         [Token::emit] is the inverse of normalization. It re-adds markers and quotes and
//!         re-escapes whatever would otherwise be read back differently, so that scanning
//!         the emitted text yields a token of the same kind and value. See [formatting].

pub mod core;
pub mod escape;
pub mod formatting;
pub mod kind;
pub mod position;

pub use self::core::{RawToken, Token};
pub use escape::{escape_ident, escape_name, escape_string, unbackslash};
pub use formatting::{detokenize, EmitError, ToCssString};
pub use kind::TokenKind;
pub use position::Position;
