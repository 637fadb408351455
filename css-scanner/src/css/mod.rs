//! Main module for CSS scanning functionality

pub mod lexing;
pub mod testing;
pub mod token;

pub use lexing::{tokenize, tokenize_raw, ProductionTable, ScanError, ScanState, Scanner};
pub use token::{EmitError, Position, RawToken, Token, TokenKind};
