//! Binary operator lowering

use crate::context::Compilation;
use crate::error::EmitError;
use ssc_ir::{FloatBinOp, FloatPredicate, Value};
use std::fmt;

/// Binary operators the source language can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `==`, recognized but never lowered
    Eq,
}

impl BinaryOp {
    /// Parse an operator symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            "==" => Some(Self::Eq),
            _ => None,
        }
    }

    /// Source spelling
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "==",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

enum Lowering {
    Arith(FloatBinOp, &'static str),
    Compare(FloatPredicate, &'static str),
}

fn lowering(op: BinaryOp) -> Option<Lowering> {
    match op {
        BinaryOp::Add => Some(Lowering::Arith(FloatBinOp::Add, "fadd")),
        BinaryOp::Sub => Some(Lowering::Arith(FloatBinOp::Sub, "fsub")),
        BinaryOp::Mul => Some(Lowering::Arith(FloatBinOp::Mul, "fmul")),
        BinaryOp::Div => Some(Lowering::Arith(FloatBinOp::Div, "fdiv")),
        BinaryOp::Gt => Some(Lowering::Compare(FloatPredicate::Ugt, "cmpgt")),
        BinaryOp::Lt => Some(Lowering::Compare(FloatPredicate::Ult, "cmplt")),
        BinaryOp::Eq => None,
    }
}

impl Compilation {
    /// Emit `lhs op rhs`
    ///
    /// Arithmetic yields a `double`; `>` and `<` yield an `i1` from an
    /// unordered compare, true when either side is NaN. `i1` operands are
    /// widened to `double` first.
    ///
    /// # Errors
    /// Returns [`EmitError::UnsupportedOperator`] for [`BinaryOp::Eq`]
    pub fn apply(&mut self, lhs: Value, rhs: Value, op: BinaryOp) -> Result<Value, EmitError> {
        let Some(lowering) = lowering(op) else {
            return Err(EmitError::UnsupportedOperator {
                symbol: op.symbol().to_string(),
            });
        };
        let lhs = self.as_double(lhs)?;
        let rhs = self.as_double(rhs)?;
        let value = match lowering {
            Lowering::Arith(bin, name) => {
                self.builder
                    .build_float_binop(&mut self.module, bin, lhs, rhs, name)?
            }
            Lowering::Compare(pred, name) => {
                self.builder.build_fcmp(&mut self.module, pred, lhs, rhs, name)?
            }
        };
        Ok(value)
    }

    /// Emit `lhs symbol rhs` for an operator spelled in the source
    ///
    /// # Errors
    /// Returns [`EmitError::UnsupportedOperator`] for anything outside
    /// `+ - * / > <`
    pub fn binary_op(&mut self, lhs: Value, rhs: Value, symbol: &str) -> Result<Value, EmitError> {
        let op = BinaryOp::from_symbol(symbol).ok_or_else(|| EmitError::UnsupportedOperator {
            symbol: symbol.to_string(),
        })?;
        self.apply(lhs, rhs, op)
    }
}
