//! IR interpreter
//!
//! Executes a finished module in-process. Used to check the semantics of
//! emitted code and by `ssc run` when no native toolchain is wanted.

pub mod interpreter;
pub mod value;

pub use interpreter::{Execution, Interpreter, InterpreterError};
pub use value::RuntimeValue;
