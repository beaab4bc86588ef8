//! Horizontal whitespace and comment skipping.
//!
//! `\n` is deliberately left alone here: it is significant and handled
//! by the main dispatch loop, never silently skipped.

use mcc_util::Result;

use super::core::Lexer;

impl<'a> Lexer<'a> {
    pub(super) fn skip_horizontal_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            if self.cursor.is_at_end() {
                return Ok(());
            }
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek_char(1) == '/' => {
                    self.skip_line_comment();
                }
                '/' if self.cursor.peek_char(1) == '*' => {
                    self.skip_block_comment();
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
    }

    /// Non-nested. An unterminated block comment silently consumes to
    /// EOF rather than raising an error, a deliberately preserved quirk.
    fn skip_block_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();
        while !self.cursor.is_at_end() {
            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                return;
            }
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tokenize;
    use crate::token::TokenKind;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn line_comment_consumed_to_newline() {
        assert_eq!(
            kinds("int // trailing\nvoid"),
            vec![
                TokenKind::Int,
                TokenKind::Newline,
                TokenKind::Void,
                TokenKind::EndOfFile
            ]
        );
    }

    #[test]
    fn block_comment_spanning_lines_emits_no_newlines() {
        assert_eq!(
            kinds("int /* spans\nmultiple\nlines */ void"),
            vec![TokenKind::Int, TokenKind::Void, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn unterminated_block_comment_consumes_to_eof_without_error() {
        assert_eq!(
            kinds("int /* never closed"),
            vec![TokenKind::Int, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn nested_markers_do_not_nest() {
        // the first `*/` closes the comment; the trailing `*/` is lexed
        // as ordinary `*` and `/` tokens, proving nesting isn't honored.
        assert_eq!(
            kinds("/* outer /* inner */ */"),
            vec![TokenKind::Star, TokenKind::Slash, TokenKind::EndOfFile]
        );
    }
}
