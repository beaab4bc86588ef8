//! Shared foundation types for the `mcc` pipeline: source spans and the
//! uniform [`CompileError`] every stage reports through.

pub mod error;
pub mod span;

pub use error::{CompileError, Result, Stage};
pub use span::Span;
