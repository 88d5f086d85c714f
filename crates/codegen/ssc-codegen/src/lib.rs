//! Single-pass IR emission for SSC scripts
//!
//! The parser drives a [`Compilation`] directly: every recognized construct
//! is lowered into the entry block of `main` as soon as it is seen. There is
//! no AST.
//!
//! # Usage
//!
//! ```rust
//! use ssc_codegen::{BinaryOp, Compilation, CompileOptions};
//!
//! let mut c = Compilation::new(CompileOptions::default())?;
//! c.write("x", c.double_constant(3.5))?;
//! c.write("y", c.double_constant(2.0))?;
//! let x = c.read("x")?;
//! let y = c.read("y")?;
//! let z = c.apply(x, y, BinaryOp::Add)?;
//! c.write("z", z)?;
//! let z = c.read("z")?;
//! c.print_number(z)?;
//!
//! let mut ir = Vec::new();
//! c.finish()?.serialize(&mut ir)?;
//! assert!(String::from_utf8(ir)?.contains("fadd double %x1, %y2"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod context;
pub mod error;
mod operators;
pub mod options;
mod output;
pub mod symbols;

pub use context::{Compilation, ENTRY_BLOCK, ENTRY_FUNCTION, FinishedModule};
pub use error::{EmitError, report_error};
pub use operators::BinaryOp;
pub use options::{CompileOptions, UninitPolicy};
pub use output::{NUMBER_FORMAT, PRINTF, STRING_FORMAT};
pub use ssc_ir::Value;
pub use symbols::{Slot, SlotId, SymbolTable};
