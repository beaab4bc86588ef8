//! The `mcc` command-line driver.
//!
//! This crate is the only external collaborator the pipeline crates
//! know nothing about: it reads a source file, hands it through
//! lex → parse → analyze → irgen → codegen in order, and writes the
//! resulting assembly to disk. Everything here is orchestration; none
//! of the four compiler stages are reimplemented.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info};

use mcc_util::{CompileError, Stage};

/// Compile a single MC source file to NASM assembly.
#[derive(Parser, Debug)]
#[command(name = "mcc")]
#[command(author, version, about = "A small imperative-language compiler", long_about = None)]
pub struct Cli {
    /// Path to the MC source file to compile.
    pub source: PathBuf,

    /// Where to write the generated assembly (default: `output.asm` in
    /// the current directory, per the compiler's fixed output contract).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable debug-level tracing of each pipeline stage.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Initializes the `tracing` subscriber used for `--verbose` diagnostics.
///
/// Safe to call more than once per process (tests invoke [`run`]
/// repeatedly); a failed re-init is not an error.
pub fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(false)
        .try_init();
}

/// Runs the full pipeline for the parsed CLI invocation.
///
/// Returns the first [`CompileError`] raised by any stage; the caller
/// (here, `main`) is responsible for printing it and choosing the exit
/// code (0 on success, 1 on any error).
pub fn run(cli: &Cli) -> Result<(), CompileError> {
    let output_path = cli.output.clone().unwrap_or_else(|| PathBuf::from("output.asm"));
    let source = read_source(&cli.source)?;
    let assembly = compile(&source)?;
    write_output(&output_path, &assembly)?;
    info!(path = %output_path.display(), "wrote assembly output");
    Ok(())
}

/// Runs lex → parse → analyze → irgen → codegen over `source`, returning
/// the generated assembly text. Exposed separately from [`run`] so tests
/// and tools can drive the pipeline over in-memory strings.
pub fn compile(source: &str) -> Result<String, CompileError> {
    debug!("lexing");
    let tokens = mcc_lex::tokenize(source)?;

    debug!("parsing");
    let program = mcc_par::parse(tokens)?;

    debug!("analyzing");
    mcc_sem::analyze(&program)?;

    debug!("generating ir");
    let ir = mcc_ir::generate(&program);

    debug!("generating assembly");
    let assembly = mcc_gen::generate(&ir)?;

    Ok(assembly)
}

fn read_source(path: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(path).map_err(|e| {
        CompileError::io(
            Stage::Lex,
            format!("reading source file '{}'", path.display()),
            e,
        )
    })
}

fn write_output(path: &Path, assembly: &str) -> Result<(), CompileError> {
    std::fs::write(path, assembly).map_err(|e| {
        CompileError::io(
            Stage::CodeGen,
            format!("writing output file '{}'", path.display()),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_minimal_program() {
        let asm = compile("int main() {\n    return 0;\n}\n").unwrap();
        assert!(asm.contains("main:"));
        assert!(asm.contains("_start:"));
    }

    #[test]
    fn surfaces_the_first_lex_error() {
        let err = compile("int main() {\n    \"unterminated\n}\n").unwrap_err();
        assert_eq!(err.stage, Stage::Lex);
    }

    #[test]
    fn surfaces_the_first_parse_error() {
        let err = compile("int main() {\n    int x = 5\n}\n").unwrap_err();
        assert_eq!(err.stage, Stage::Parse);
    }

    #[test]
    fn surfaces_the_first_semantic_error() {
        let err = compile("void main() {\n    x = 1;\n}\n").unwrap_err();
        assert_eq!(err.stage, Stage::Semantic);
    }

    #[test]
    fn read_source_wraps_io_failures_as_lex_stage() {
        let err = read_source(Path::new("/nonexistent/path/to/source.mc")).unwrap_err();
        assert_eq!(err.stage, Stage::Lex);
    }
}
