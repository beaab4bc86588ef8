//! The token model.
//!
//! Tokens are tagged values carrying their own payload (literal value or
//! lexeme) rather than a loose "kind + string" pair; the closed set of
//! kinds is expressed as a Rust enum so an unknown variant is statically
//! impossible downstream.

use mcc_util::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Int,
    Void,
    Str,
    If,
    Else,
    While,
    Return,

    Identifier(String),
    IntLiteral(i64),
    StringLiteral(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Bang,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Semicolon,

    // Layout
    Newline,
    Indent,
    Dedent,
    EndOfFile,
}

impl TokenKind {
    /// The keyword this identifier spells, if any.
    pub fn keyword_from_ident(ident: &str) -> Option<TokenKind> {
        Some(match ident {
            "int" => TokenKind::Int,
            "void" => TokenKind::Void,
            "string" => TokenKind::Str,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_matches_table() {
        assert_eq!(TokenKind::keyword_from_ident("int"), Some(TokenKind::Int));
        assert_eq!(
            TokenKind::keyword_from_ident("string"),
            Some(TokenKind::Str)
        );
        assert_eq!(TokenKind::keyword_from_ident("returns"), None);
    }
}
