//! IR interpreter

use crate::value::{Pointer, RuntimeValue, format_c_float};
use rustc_hash::FxHashMap;
use ssc_ir::{Body, InstId, InstKind, Module, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Interpreter error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpreterError {
    /// The module has no defined function of the requested name
    #[error("no function `{0}` with a body")]
    NoEntry(String),
    /// A stack slot was loaded before anything was stored into it
    #[error("load from uninitialized slot `%{0}`")]
    UninitializedLoad(String),
    /// Type mismatch
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type
        expected: &'static str,
        /// Got type
        got: &'static str,
    },
    /// Call to something other than a known host function
    #[error("cannot call `{0}`")]
    UnsupportedCall(String),
    /// `printf` format the interpreter cannot render
    #[error("invalid printf format: {0}")]
    BadFormat(String),
    /// Control fell off the end of a block
    #[error("block `{0}` has no terminator")]
    MissingTerminator(String),
}

/// Result of running a module
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Value returned by the entry function
    pub exit_code: i32,
    /// Everything written through `printf`
    pub stdout: String,
    /// Final contents of the stored stack slots, keyed by slot name
    pub slots: BTreeMap<String, RuntimeValue>,
}

impl Execution {
    /// Final `double` held by the slot named `name`
    pub fn slot_double(&self, name: &str) -> Option<f64> {
        self.slots.get(name).and_then(RuntimeValue::as_double)
    }
}

/// Interpreter state
#[derive(Debug, Default)]
pub struct Interpreter {
    /// SSA values computed so far
    values: FxHashMap<InstId, RuntimeValue>,
    /// Contents of stack slots
    memory: FxHashMap<InstId, RuntimeValue>,
    stdout: String,
}

impl Interpreter {
    /// Create a new interpreter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `main` of `module`
    ///
    /// # Errors
    /// Returns `InterpreterError` if execution fails
    pub fn run(self, module: &Module) -> Result<Execution, InterpreterError> {
        self.run_function(module, "main")
    }

    /// Run the function `name` of `module`
    ///
    /// # Errors
    /// Returns `InterpreterError` if execution fails
    pub fn run_function(mut self, module: &Module, name: &str) -> Result<Execution, InterpreterError> {
        let body = module
            .get_function(name)
            .and_then(|id| module.functions[id].body.as_ref())
            .ok_or_else(|| InterpreterError::NoEntry(name.to_string()))?;

        // Straight-line code: the first block must end in a return.
        let Some(block) = body.blocks.first() else {
            return Err(InterpreterError::NoEntry(name.to_string()));
        };
        for id in &block.instructions {
            if let Some(ret) = self.execute(module, body, *id)? {
                let exit_code = match ret {
                    Some(RuntimeValue::Int(code)) => code,
                    Some(other) => {
                        return Err(InterpreterError::TypeMismatch {
                            expected: "i32",
                            got: other.type_name(),
                        });
                    }
                    None => 0,
                };
                debug!(exit_code, "entry function returned");
                let slots = self
                    .memory
                    .iter()
                    .filter_map(|(slot, value)| {
                        let name = body.instructions[*slot].name.clone()?;
                        Some((name, *value))
                    })
                    .collect();
                return Ok(Execution {
                    exit_code,
                    stdout: self.stdout,
                    slots,
                });
            }
        }
        Err(InterpreterError::MissingTerminator(block.label.clone()))
    }

    /// Execute one instruction; `Some` means the function returned
    fn execute(
        &mut self,
        module: &Module,
        body: &Body,
        id: InstId,
    ) -> Result<Option<Option<RuntimeValue>>, InterpreterError> {
        let inst = &body.instructions[id];
        let result = match &inst.kind {
            InstKind::Alloca { .. } => RuntimeValue::Ptr(Pointer::Slot(id)),
            InstKind::Load { ptr, .. } => {
                let slot = self.slot(*ptr)?;
                *self.memory.get(&slot).ok_or_else(|| {
                    let name = body.instructions[slot].name.clone().unwrap_or_default();
                    InterpreterError::UninitializedLoad(name)
                })?
            }
            InstKind::Store { value, ptr } => {
                let value = self.eval(*value)?;
                let slot = self.slot(*ptr)?;
                self.memory.insert(slot, value);
                return Ok(None);
            }
            InstKind::Binary { op, lhs, rhs } => {
                RuntimeValue::Double(op.eval(self.eval_double(*lhs)?, self.eval_double(*rhs)?))
            }
            InstKind::FCmp { pred, lhs, rhs } => {
                RuntimeValue::Bool(pred.eval(self.eval_double(*lhs)?, self.eval_double(*rhs)?))
            }
            InstKind::UiToFp { value } => match self.eval(*value)? {
                RuntimeValue::Bool(flag) => RuntimeValue::Double(f64::from(u8::from(flag))),
                RuntimeValue::Int(int) => RuntimeValue::Double(f64::from(int as u32)),
                other => {
                    return Err(InterpreterError::TypeMismatch {
                        expected: "integer",
                        got: other.type_name(),
                    });
                }
            },
            InstKind::Call { callee, args } => {
                let target = &module.functions[*callee];
                if target.name != "printf" || !target.is_declaration() {
                    return Err(InterpreterError::UnsupportedCall(target.name.clone()));
                }
                let args = args
                    .iter()
                    .map(|arg| self.eval(*arg))
                    .collect::<Result<Vec<_>, _>>()?;
                RuntimeValue::Int(self.printf(module, &args)?)
            }
            InstKind::Ret { value } => {
                let value = value.map(|value| self.eval(value)).transpose()?;
                return Ok(Some(value));
            }
        };
        self.values.insert(id, result);
        Ok(None)
    }

    fn eval(&self, value: Value) -> Result<RuntimeValue, InterpreterError> {
        match value {
            Value::Double(val) => Ok(RuntimeValue::Double(val)),
            Value::I32(val) => Ok(RuntimeValue::Int(val)),
            Value::Global(id) => Ok(RuntimeValue::Ptr(Pointer::Global(id))),
            Value::Inst(id) => self.values.get(&id).copied().ok_or_else(|| {
                InterpreterError::TypeMismatch {
                    expected: "computed value",
                    got: "void",
                }
            }),
        }
    }

    fn eval_double(&self, value: Value) -> Result<f64, InterpreterError> {
        let value = self.eval(value)?;
        value.as_double().ok_or(InterpreterError::TypeMismatch {
            expected: "double",
            got: value.type_name(),
        })
    }

    fn slot(&self, ptr: Value) -> Result<InstId, InterpreterError> {
        match self.eval(ptr)? {
            RuntimeValue::Ptr(Pointer::Slot(slot)) => Ok(slot),
            other => Err(InterpreterError::TypeMismatch {
                expected: "stack slot",
                got: other.type_name(),
            }),
        }
    }

    /// Host `printf` supporting `%s`, `%f` and `%%`
    fn printf(&mut self, module: &Module, args: &[RuntimeValue]) -> Result<i32, InterpreterError> {
        let Some((format, rest)) = args.split_first() else {
            return Err(InterpreterError::BadFormat("missing format argument".to_string()));
        };
        let format = c_string(module, *format)?;
        let mut rest = rest.iter();
        let mut out = String::new();
        let mut chars = format.chars();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('%') => out.push('%'),
                Some('s') => {
                    let arg = rest.next().ok_or_else(|| missing_arg(&format))?;
                    out.push_str(&c_string(module, *arg)?);
                }
                Some('f') => {
                    let arg = rest.next().ok_or_else(|| missing_arg(&format))?;
                    let value = arg.as_double().ok_or(InterpreterError::TypeMismatch {
                        expected: "double",
                        got: arg.type_name(),
                    })?;
                    out.push_str(&format_c_float(value));
                }
                other => {
                    return Err(InterpreterError::BadFormat(format!(
                        "unsupported conversion `%{}`",
                        other.map(String::from).unwrap_or_default()
                    )));
                }
            }
        }

        self.stdout.push_str(&out);
        Ok(out.len() as i32)
    }
}

fn missing_arg(format: &str) -> InterpreterError {
    InterpreterError::BadFormat(format!("not enough arguments for {format:?}"))
}

fn c_string(module: &Module, value: RuntimeValue) -> Result<String, InterpreterError> {
    match value {
        RuntimeValue::Ptr(Pointer::Global(id)) => {
            Ok(String::from_utf8_lossy(&module.globals[id].bytes).into_owned())
        }
        other => Err(InterpreterError::TypeMismatch {
            expected: "string pointer",
            got: other.type_name(),
        }),
    }
}
