//! Fatal error rendering

use colored::Colorize;
use ssc_codegen::report_error;
use ssc_parser::ParseError;
use std::io::{self, Write};
use tracing::debug;

/// Print `err` to stderr
///
/// Parse and emission errors get a miette report with the offending source
/// span; everything else is framed by blank lines.
pub fn report(err: &anyhow::Error) {
    let mut stderr = io::stderr().lock();
    let written = match err.downcast_ref::<ParseError>() {
        Some(parse) => writeln!(stderr, "{:?}", miette::Report::new(parse.clone())),
        None => report_error(&mut stderr, &format!("{} {err:#}", "error:".red().bold())),
    };
    if let Err(io_err) = written {
        debug!(%io_err, "stderr closed before the error was reported");
    }
}
