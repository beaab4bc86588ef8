//! AST → three-address IR lowering.

pub mod ir;
mod generator;

pub use generator::{generate, IrGenerator};
