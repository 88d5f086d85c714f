//! Compilation driver and high-level APIs
//!
//! Ties the single-pass parser, the emission core and the interpreter into
//! whole-file operations. Parse and emission failures come back as
//! [`ssc_parser::ParseError`] inside the [`anyhow::Error`], so callers can
//! downcast and render them with miette.

pub mod config;

pub use config::{CONFIG_FILE, Config};

use anyhow::{Context, Result};
use ssc_codegen::CompileOptions;
use ssc_interpreter::{Execution, Interpreter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Compile source text to LLVM textual IR
pub fn compile_source(source: &str, name: &str, options: &CompileOptions) -> Result<String> {
    let finished = ssc_parser::compile(source, name, options.clone())?;
    let mut ir = Vec::new();
    finished.serialize(&mut ir).context("Failed to serialize module")?;
    debug!(bytes = ir.len(), "serialized module");
    String::from_utf8(ir).context("Serialized module is not valid UTF-8")
}

/// Compile a file to LLVM textual IR
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<String> {
    let source = read_source(path)?;
    compile_source(&source, &path.display().to_string(), options)
}

/// Compile `input` and write the IR to `output`
///
/// Nothing is written unless the whole file compiles.
pub fn build_file(input: &Path, output: &Path, options: &CompileOptions) -> Result<()> {
    let ir = compile_file(input, options)?;
    std::fs::write(output, ir)
        .with_context(|| format!("Failed to write IR to {}", output.display()))?;
    info!(input = %input.display(), output = %output.display(), "wrote module");
    Ok(())
}

/// Default IR path for a script: same stem, `.ll` extension
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("ll")
}

/// Compile source text and execute it with the interpreter
pub fn run_source(source: &str, name: &str, options: &CompileOptions) -> Result<Execution> {
    let module = ssc_parser::compile(source, name, options.clone())?.into_module();
    let execution = Interpreter::new()
        .run(&module)
        .with_context(|| format!("Failed to execute {name}"))?;
    Ok(execution)
}

/// Compile a file and execute it with the interpreter
pub fn run_file(path: &Path, options: &CompileOptions) -> Result<Execution> {
    let source = read_source(path)?;
    run_source(&source, &path.display().to_string(), options)
}

/// Compile source text, discarding the result
pub fn check_source(source: &str, name: &str, options: &CompileOptions) -> Result<()> {
    ssc_parser::compile(source, name, options.clone())?;
    Ok(())
}

/// Compile a file, discarding the result
pub fn check_file(path: &Path, options: &CompileOptions) -> Result<()> {
    let source = read_source(path)?;
    check_source(&source, &path.display().to_string(), options)
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))
}
