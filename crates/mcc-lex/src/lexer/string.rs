//! String literals: `"..."` with escapes `\n \t \r \b \" \\`. Any other
//! escape is an error, as is reaching a bare newline or EOF before the
//! closing quote.

use mcc_util::Result;

use crate::token::{Token, TokenKind};

use super::core::Lexer;

impl<'a> Lexer<'a> {
    pub(super) fn lex_string(&mut self) -> Result<Token> {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() || self.cursor.current_char() == '\n' {
                return Err(self.error("unterminated string literal"));
            }
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    break;
                }
                '\\' => {
                    self.cursor.advance();
                    value.push(self.parse_escape()?);
                }
                c => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        Ok(self.make_token(TokenKind::StringLiteral(value)))
    }

    fn parse_escape(&mut self) -> Result<char> {
        if self.cursor.is_at_end() || self.cursor.current_char() == '\n' {
            return Err(self.error("unterminated string literal"));
        }
        let c = self.cursor.current_char();
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            '"' => '"',
            '\\' => '\\',
            other => return Err(self.error(format!("invalid escape sequence '\\{}'", other))),
        };
        self.cursor.advance();
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tokenize;
    use crate::token::TokenKind;

    #[test]
    fn decodes_known_escapes() {
        let tokens = tokenize(r#""a\nb\t\"c\\""#).unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::StringLiteral("a\nb\t\"c\\".to_string())
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("\"abc").is_err());
    }

    #[test]
    fn newline_inside_string_is_an_error() {
        assert!(tokenize("\"abc\ndef\"").is_err());
    }

    #[test]
    fn unknown_escape_is_an_error() {
        assert!(tokenize(r#""\q""#).is_err());
    }
}
