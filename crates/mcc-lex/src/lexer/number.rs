//! Integer literals: decimal only, unbounded contiguous digits.

use mcc_util::Result;

use crate::token::{Token, TokenKind};

use super::core::Lexer;

impl<'a> Lexer<'a> {
    pub(super) fn lex_number(&mut self) -> Result<Token> {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let value: i64 = text
            .parse()
            .map_err(|_| self.error(format!("invalid integer literal '{}'", text)))?;
        Ok(self.make_token(TokenKind::IntLiteral(value)))
    }
}
