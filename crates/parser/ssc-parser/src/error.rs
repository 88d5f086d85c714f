//! Rich error reporting for the parser
//!
//! Note: These struct fields are read by miette's `#[derive(Diagnostic)]`
//! expansion, which the unused-assignment lint cannot see through.

#![allow(unused_assignments)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use ssc_codegen::EmitError;
use thiserror::Error;

/// Parse error with rich diagnostic information
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum ParseError {
    /// Token that cannot appear here
    #[error("unexpected token `{token}`")]
    #[diagnostic(code(parser::unexpected_token), help("expected {expected}"))]
    UnexpectedToken {
        /// What was found
        token: String,
        /// What the grammar allows here
        expected: String,
        /// Source location
        #[label("unexpected token")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// Character that starts no token
    #[error("unexpected character `{ch}`")]
    #[diagnostic(code(parser::unexpected_char))]
    UnexpectedChar {
        /// The character
        ch: char,
        /// Source location
        #[label("not valid here")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// String literal missing its closing quote
    #[error("unterminated string literal")]
    #[diagnostic(code(parser::unterminated_string), help("add a closing `\"`"))]
    UnterminatedString {
        /// Source location
        #[label("string starts here")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// Numeric literal that does not parse
    #[error("invalid number `{text}`")]
    #[diagnostic(code(parser::invalid_number))]
    InvalidNumber {
        /// Literal text
        text: String,
        /// Source location
        #[label("invalid number")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// Input ended in the middle of a construct
    #[error("unexpected end of input")]
    #[diagnostic(code(parser::unexpected_eof), help("expected {expected}"))]
    UnexpectedEof {
        /// What was expected
        expected: String,
        /// End of the source
        #[label("input ends here")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// Lowering rejected a construct
    #[error("{source}")]
    #[diagnostic(code(codegen::emit))]
    Emit {
        /// Underlying emission error
        source: EmitError,
        /// Source location
        #[label("here")]
        span: SourceSpan,
        /// Source code for context
        #[source_code]
        src: NamedSource<String>,
    },
}

impl ParseError {
    /// The emission error behind this diagnostic, if any
    pub fn emit_error(&self) -> Option<&EmitError> {
        match self {
            Self::Emit { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether this error came from lowering rather than from the syntax
    pub fn is_emit(&self) -> bool {
        self.emit_error().is_some()
    }
}
