//! Check command implementation

use anyhow::Result;
use colored::Colorize;
use ssc_codegen::CompileOptions;
use std::path::Path;

pub fn check(file: &Path, options: &CompileOptions) -> Result<()> {
    eprintln!("{} {}", "Checking".green().bold(), file.display());
    ssc_driver::check_file(file, options)?;
    eprintln!("{} No errors found", "Success:".green().bold());
    Ok(())
}
