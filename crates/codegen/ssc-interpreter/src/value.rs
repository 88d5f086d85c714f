//! Runtime value representation

use ssc_ir::{GlobalId, InstId};

/// Address of something the interpreter can load from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    /// A stack slot created by `alloca`
    Slot(InstId),
    /// A global string constant
    Global(GlobalId),
}

/// Runtime value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuntimeValue {
    /// `i1`
    Bool(bool),
    /// `i32`
    Int(i32),
    /// `double`
    Double(f64),
    /// `ptr`
    Ptr(Pointer),
}

impl RuntimeValue {
    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "i1",
            Self::Int(_) => "i32",
            Self::Double(_) => "double",
            Self::Ptr(_) => "ptr",
        }
    }

    /// Get the value as a double, if it is one
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(val) => Some(*val),
            _ => None,
        }
    }
}

/// Render a double the way C's `%f` does
pub fn format_c_float(value: f64) -> String {
    if value.is_nan() {
        String::from(if value.is_sign_negative() { "-nan" } else { "nan" })
    } else if value.is_infinite() {
        String::from(if value.is_sign_negative() { "-inf" } else { "inf" })
    } else {
        format!("{value:.6}")
    }
}
