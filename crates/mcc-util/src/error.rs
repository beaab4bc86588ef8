//! The compiler's uniform error type.
//!
//! Every pipeline stage surfaces failures as a single [`CompileError`]
//! tagged with the stage it occurred in. There is no
//! error recovery and no multi-error collection: the first failure wins
//! and the driver reports it.

use std::fmt;
use thiserror::Error;

use crate::span::Span;

/// Which pipeline stage raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
    IrGen,
    CodeGen,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Semantic => "semantic",
            Stage::IrGen => "irgen",
            Stage::CodeGen => "codegen",
        };
        f.write_str(name)
    }
}

/// A single failure from the compilation pipeline.
///
/// `span` is absent only for errors that have no meaningful source
/// position (e.g. an I/O failure writing the output file).
#[derive(Debug, Error)]
#[error("{stage}: {message}{}", format_position(.span))]
pub struct CompileError {
    pub stage: Stage,
    pub message: String,
    pub span: Option<Span>,
    #[source]
    pub source: Option<std::io::Error>,
}

fn format_position(span: &Option<Span>) -> String {
    match span {
        Some(s) => format!(" at {}:{}", s.line, s.column),
        None => String::new(),
    }
}

impl CompileError {
    pub fn new(stage: Stage, message: impl Into<String>, span: Span) -> Self {
        Self {
            stage,
            message: message.into(),
            span: Some(span),
            source: None,
        }
    }

    pub fn io(stage: Stage, message: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            stage,
            message: message.into(),
            span: None,
            source: Some(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_stage_and_position() {
        let err = CompileError::new(Stage::Lex, "unterminated string", Span::new(0, 1, 3, 7));
        assert_eq!(err.to_string(), "lex: unterminated string at 3:7");
    }

    #[test]
    fn io_errors_have_no_position() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let err = CompileError::io(Stage::CodeGen, "writing output.asm", io_err);
        assert_eq!(err.to_string(), "codegen: writing output.asm");
    }
}
