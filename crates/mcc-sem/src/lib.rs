//! Name resolution and type checking over the parsed AST.

mod analyzer;
mod scope;

pub use analyzer::{analyze, SemanticAnalyzer};
