//! Code generation failures.
//!
//! By the time IR reaches this stage every instruction has already been
//! validated and the opcode set is closed, so the only way left to fail
//! is an I/O error writing the generated assembly.

use thiserror::Error;

use mcc_util::{CompileError, Stage};

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("failed to write assembly output")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;

impl From<CodeGenError> for CompileError {
    fn from(err: CodeGenError) -> Self {
        match err {
            CodeGenError::Io(io_err) => {
                CompileError::io(Stage::CodeGen, "writing assembly output", io_err)
            }
        }
    }
}
