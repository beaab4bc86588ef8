//! Source text → token sequence, with indentation-aware newline handling.

pub mod cursor;
mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
