//! Identifiers and keywords.

use mcc_util::Result;

use crate::token::{Token, TokenKind};

use super::core::Lexer;

impl<'a> Lexer<'a> {
    pub(super) fn lex_identifier(&mut self) -> Result<Token> {
        let start = self.cursor.position();
        while matches!(self.cursor.current_char(), c if is_ident_continue(c)) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let kind = TokenKind::keyword_from_ident(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Ok(self.make_token(kind))
    }
}

/// `[A-Za-z_][A-Za-z0-9_$]*`.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::super::core::tokenize;
    use crate::token::TokenKind;

    #[test]
    fn keywords_are_recognized() {
        let tokens = tokenize("int void if else while return string").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Void,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Return,
                TokenKind::Str,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn plain_identifier_roundtrips_its_name() {
        let tokens = tokenize("foo_bar$1").unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Identifier("foo_bar$1".to_string())
        );
    }
}
