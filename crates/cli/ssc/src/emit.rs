//! Emit command implementation

use anyhow::{Context, Result};
use ssc_codegen::CompileOptions;
use std::io::{self, Write};
use std::path::Path;

pub fn emit(file: &Path, options: &CompileOptions) -> Result<()> {
    let ir = ssc_driver::compile_file(file, options)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(ir.as_bytes()).context("Failed to write IR to stdout")?;
    stdout.flush()?;
    Ok(())
}
