//! Emission errors and the diagnostic sink

use ssc_ir::builder::BuildError;
use std::io::{self, Write};
use thiserror::Error;

/// Errors returned by the emission core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// Operator outside `+ - * / > <`, including the unwired `==`
    #[error("illegal binary operation `{symbol}`")]
    UnsupportedOperator {
        /// The operator as written in the source
        symbol: String,
    },

    /// A variable was read before any value was stored into it
    #[error("variable `{name}` is read before it is assigned")]
    UninitializedRead {
        /// Variable name
        name: String,
    },

    /// The IR builder rejected an instruction
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Write `message` framed by blank lines to `sink`
///
/// Reporting never stops the compilation by itself; callers decide whether
/// to terminate after a fatal error.
///
/// # Errors
/// Propagates write failures of `sink`
pub fn report_error<W: Write + ?Sized>(sink: &mut W, message: &str) -> io::Result<()> {
    writeln!(sink, "\n{message}")?;
    sink.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_error_frames_message() {
        let mut sink = Vec::new();
        report_error(&mut sink, "illegal binary operation").unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "\nillegal binary operation\n");
    }

    #[test]
    fn test_unsupported_operator_message() {
        let err = EmitError::UnsupportedOperator {
            symbol: "%".to_string(),
        };
        assert_eq!(err.to_string(), "illegal binary operation `%`");
    }
}
