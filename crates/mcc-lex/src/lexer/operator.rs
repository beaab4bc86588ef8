//! Operators and punctuation: `+ - * / = == != < > <= >= !` and
//! `( ) { } : , ;`.

use mcc_util::Result;

use crate::token::TokenKind;

use super::core::Lexer;

impl<'a> Lexer<'a> {
    /// Returns `None` if the current character isn't the start of any
    /// operator or punctuation token; the main dispatch treats that as an
    /// unexpected character.
    pub(super) fn lex_operator_or_punct(&mut self) -> Result<Option<TokenKind>> {
        let c = self.cursor.current_char();
        let kind = match c {
            '+' => {
                self.cursor.advance();
                TokenKind::Plus
            }
            '-' => {
                self.cursor.advance();
                TokenKind::Minus
            }
            '*' => {
                self.cursor.advance();
                TokenKind::Star
            }
            '/' => {
                self.cursor.advance();
                TokenKind::Slash
            }
            '=' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '(' => {
                self.cursor.advance();
                TokenKind::LParen
            }
            ')' => {
                self.cursor.advance();
                TokenKind::RParen
            }
            '{' => {
                self.cursor.advance();
                TokenKind::LBrace
            }
            '}' => {
                self.cursor.advance();
                TokenKind::RBrace
            }
            ':' => {
                self.cursor.advance();
                TokenKind::Colon
            }
            ',' => {
                self.cursor.advance();
                TokenKind::Comma
            }
            ';' => {
                self.cursor.advance();
                TokenKind::Semicolon
            }
            _ => return Ok(None),
        };
        Ok(Some(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tokenize;
    use crate::token::TokenKind::*;

    #[test]
    fn two_character_operators_win_over_one_character_prefixes() {
        let tokens = tokenize("== != <= >=").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Eq, NotEq, Le, Ge, EndOfFile]);
    }

    #[test]
    fn single_character_fallbacks() {
        let tokens = tokenize("= ! < >").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Assign, Bang, Lt, Gt, EndOfFile]);
    }

    #[test]
    fn punctuation() {
        let tokens = tokenize("(){}:,;").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![LParen, RParen, LBrace, RBrace, Colon, Comma, Semicolon, EndOfFile]
        );
    }
}
