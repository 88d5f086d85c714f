//! Run command implementation

use anyhow::{Context, Result};
use ssc_codegen::CompileOptions;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

pub fn run(file: &Path, options: &CompileOptions) -> Result<ExitCode> {
    let execution = ssc_driver::run_file(file, options)?;
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(execution.stdout.as_bytes())
        .context("Failed to write program output")?;
    stdout.flush()?;

    info!(exit_code = execution.exit_code, "program finished");
    // Exit statuses are a byte wide, as with a native run.
    Ok(ExitCode::from(execution.exit_code as u8))
}
