use std::collections::VecDeque;

use mcc_util::{CompileError, Result, Span, Stage};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Character stream → token sequence.
///
/// Lexing is eager and fallible: the first malformed token aborts the
/// whole pass, there is no recovery. [`tokenize`] drives a `Lexer` to
/// completion and is the entry point callers should use.
pub struct Lexer<'a> {
    pub(super) cursor: Cursor<'a>,
    /// Open indentation widths, seeded with a column-0 base level.
    pub(super) indent_stack: Vec<u32>,
    /// INDENT/DEDENT/NEWLINE tokens produced by a line-start scan that
    /// haven't been returned to the caller yet.
    pub(super) pending: VecDeque<Token>,
    /// Set after a `NEWLINE` is returned; the next call must scan the new
    /// line's indentation before lexing its first real token.
    pub(super) at_line_start: bool,
    pub(super) eof_emitted: bool,
    pub(super) token_start: usize,
    pub(super) token_start_line: u32,
    pub(super) token_start_column: u32,
}

/// Lex `source` in full, returning its tokens including the trailing
/// `EndOfFile`, or the first lexical error encountered.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::EndOfFile;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            indent_stack: vec![0],
            pending: VecDeque::new(),
            at_line_start: true,
            eof_emitted: false,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(token);
        }

        if self.at_line_start {
            self.at_line_start = false;
            self.scan_indentation()?;
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
        }

        self.skip_horizontal_whitespace_and_comments()?;
        self.mark_token_start();

        if self.cursor.is_at_end() {
            return self.finish_at_eof();
        }

        let c = self.cursor.current_char();
        if c == '\n' {
            self.cursor.advance();
            self.at_line_start = true;
            return Ok(self.make_token(TokenKind::Newline));
        }
        if c.is_ascii_digit() {
            return self.lex_number();
        }
        if c == '_' || c.is_ascii_alphabetic() {
            return self.lex_identifier();
        }
        if c == '"' {
            return self.lex_string();
        }
        if let Some(kind) = self.lex_operator_or_punct()? {
            return Ok(self.make_token(kind));
        }

        Err(self.error(format!("unexpected character '{}'", c)))
    }

    /// Once content is exhausted, unwind any open indentation levels with
    /// DEDENT tokens, then emit a single terminal EndOfFile.
    fn finish_at_eof(&mut self) -> Result<Token> {
        self.mark_token_start();
        if self.eof_emitted {
            return Ok(self.make_token(TokenKind::EndOfFile));
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending.push_back(self.make_token(TokenKind::Dedent));
        }
        self.eof_emitted = true;
        self.pending.push_back(self.make_token(TokenKind::EndOfFile));
        Ok(self.pending.pop_front().unwrap())
    }

    pub(super) fn mark_token_start(&mut self) {
        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();
    }

    pub(super) fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            Span::new(
                self.token_start,
                self.cursor.position(),
                self.token_start_line,
                self.token_start_column,
            ),
        )
    }

    pub(super) fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(
            Stage::Lex,
            message,
            Span::new(
                self.token_start,
                self.cursor.position(),
                self.token_start_line,
                self.token_start_column,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfFile]);
    }

    #[test]
    fn positions_point_at_first_character() {
        let tokens = tokenize("  int").unwrap();
        let int_tok = &tokens[0];
        assert_eq!(int_tok.kind, TokenKind::Int);
        assert_eq!(int_tok.span.column, 3);
        assert_eq!(int_tok.span.line, 1);
    }

    #[test]
    fn newline_is_significant() {
        assert_eq!(
            kinds("int\nvoid"),
            vec![
                TokenKind::Int,
                TokenKind::Newline,
                TokenKind::Void,
                TokenKind::EndOfFile
            ]
        );
    }
}
