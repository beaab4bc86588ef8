//! Indentation tracking.
//!
//! Runs once per line, right after a `NEWLINE` has been handed back to the
//! caller. Measures the new line's leading whitespace and reconciles it
//! against the stack of open indentation widths, queuing INDENT/DEDENT
//! tokens for [`Lexer::next_token`] to drain before it resumes normal
//! dispatch.

use mcc_util::Result;

use crate::token::TokenKind;

use super::core::Lexer;

impl<'a> Lexer<'a> {
    pub(super) fn scan_indentation(&mut self) -> Result<()> {
        loop {
            self.mark_token_start();
            let width = self.measure_indentation_width()?;

            if self.cursor.is_at_end() {
                return Ok(());
            }

            if self.cursor.current_char() == '\n' {
                self.cursor.advance();
                self.pending.push_back(self.make_token(TokenKind::Newline));
                continue;
            }

            let top = *self.indent_stack.last().unwrap();
            if width > top {
                self.indent_stack.push(width);
                self.pending.push_back(self.make_token(TokenKind::Indent));
            } else if width < top {
                while *self.indent_stack.last().unwrap() > width {
                    self.indent_stack.pop();
                    self.pending.push_back(self.make_token(TokenKind::Dedent));
                }
                if *self.indent_stack.last().unwrap() != width {
                    return Err(self.error("inconsistent indentation"));
                }
            }
            return Ok(());
        }
    }

    /// Counts leading spaces/tabs (tab = 4) without consuming anything
    /// past them. Mixing tabs and spaces on one line's indentation is a
    /// hard error.
    fn measure_indentation_width(&mut self) -> Result<u32> {
        let mut width = 0u32;
        let mut saw_space = false;
        let mut saw_tab = false;
        loop {
            match self.cursor.current_char() {
                ' ' => {
                    saw_space = true;
                    width += 1;
                    self.cursor.advance();
                }
                '\t' => {
                    saw_tab = true;
                    width += 4;
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        if saw_space && saw_tab {
            return Err(self.error("cannot mix tabs and spaces in indentation"));
        }
        Ok(width)
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tokenize;
    use crate::token::TokenKind::*;

    fn kinds(src: &str) -> Vec<crate::token::TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn indent_then_dedent() {
        let src = "if\n    return\nvoid";
        assert_eq!(
            kinds(src),
            vec![If, Newline, Indent, Return, Newline, Dedent, Void, EndOfFile]
        );
    }

    #[test]
    fn blank_lines_do_not_change_indentation() {
        let src = "if\n\n    return";
        assert_eq!(
            kinds(src),
            vec![If, Newline, Newline, Indent, Return, EndOfFile]
        );
    }

    #[test]
    fn mixed_tabs_and_spaces_is_an_error() {
        let src = "if\n \treturn";
        assert!(tokenize(src).is_err());
    }

    #[test]
    fn inconsistent_dedent_is_an_error() {
        // opens width 4, then width 6, then tries to dedent to width 2
        // which is not on the stack.
        let src = "if\n    a\n      b\n  c";
        assert!(tokenize(src).is_err());
    }
}
