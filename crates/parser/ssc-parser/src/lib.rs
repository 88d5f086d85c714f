//! Lexer and single-pass parser for SSC scripts
//!
//! Parsing and lowering happen together: the parser drives a
//! [`Compilation`] and returns the finished module.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::ParseError;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use miette::NamedSource;
use ssc_codegen::{Compilation, CompileOptions, EmitError, FinishedModule};

/// Parse `source` into an existing compilation
///
/// # Errors
/// Returns the first syntax or emission error
pub fn parse_into(source: &str, name: &str, compilation: &mut Compilation) -> Result<(), ParseError> {
    Parser::new(source, name, compilation)?.parse_program()
}

/// Parse and lower `source` into a finished module
///
/// # Errors
/// Returns the first syntax or emission error
pub fn compile(source: &str, name: &str, options: CompileOptions) -> Result<FinishedModule, ParseError> {
    let whole_file = |err: EmitError| ParseError::Emit {
        source: err,
        span: (0, source.len()).into(),
        src: NamedSource::new(name, source.to_string()),
    };
    let mut compilation = Compilation::new(options).map_err(whole_file)?;
    parse_into(source, name, &mut compilation)?;
    compilation.finish().map_err(whole_file)
}
