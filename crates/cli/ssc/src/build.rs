//! Build command implementation

use anyhow::Result;
use colored::Colorize;
use ssc_codegen::CompileOptions;
use std::path::Path;
use std::time::Instant;

pub fn build(file: &Path, output: Option<&Path>, options: &CompileOptions) -> Result<()> {
    let start = Instant::now();
    let output = output.map_or_else(|| ssc_driver::default_output_path(file), Path::to_path_buf);

    eprintln!("{} {}", "Compiling".green().bold(), file.display());
    ssc_driver::build_file(file, &output, options)?;

    eprintln!(
        "{} {} in {:.2}s",
        "Finished".green().bold(),
        output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
