//! Textual LLVM IR output
//!
//! Output follows what `Module::print` produces in LLVM 15+ (opaque
//! pointers) so downstream tools consume it directly.

use crate::{Body, Function, Global, InstKind, Instruction, IrType, Module, Value};
use std::fmt;

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "source_filename = \"{}\"", escape_bytes(self.name.as_bytes()))?;

        if !self.globals.is_empty() {
            writeln!(f)?;
            for (_, global) in self.globals.iter() {
                writeln!(f, "{global}")?;
            }
        }

        for (_, function) in self.functions.iter() {
            writeln!(f)?;
            write_function(f, self, function)?;
        }

        Ok(())
    }
}

impl fmt::Display for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{} = private unnamed_addr constant [{} x i8] c\"{}\\00\", align 1",
            self.number,
            self.len_with_nul(),
            escape_bytes(&self.bytes)
        )
    }
}

fn write_function(f: &mut fmt::Formatter<'_>, module: &Module, function: &Function) -> fmt::Result {
    let mut params = function
        .signature
        .params
        .iter()
        .map(|ty| ty.as_str().to_string())
        .collect::<Vec<_>>();
    if function.signature.variadic {
        params.push("...".to_string());
    }
    let ret = function.signature.ret.as_str();

    let Some(body) = &function.body else {
        return writeln!(f, "declare {ret} @{}({})", function.name, params.join(", "));
    };

    writeln!(f, "define {ret} @{}({}) {{", function.name, params.join(", "))?;
    for block in &body.blocks {
        writeln!(f, "{}:", block.label)?;
        for id in &block.instructions {
            write!(f, "  ")?;
            write_instruction(f, module, body, &body.instructions[*id])?;
            writeln!(f)?;
        }
    }
    writeln!(f, "}}")
}

fn write_instruction(
    out: &mut fmt::Formatter<'_>,
    module: &Module,
    body: &Body,
    inst: &Instruction,
) -> fmt::Result {
    if let Some(name) = &inst.name {
        write!(out, "{} = ", local_name(name))?;
    }
    let operand = |value: Value| render_value(module, body, value);
    let typed = |value: Value| format!("{} {}", body.value_type(value).as_str(), operand(value));

    match &inst.kind {
        InstKind::Alloca { ty } => write!(out, "alloca {}, align {}", ty.as_str(), ty.align()),
        InstKind::Load { ty, ptr } => write!(
            out,
            "load {}, ptr {}, align {}",
            ty.as_str(),
            operand(*ptr),
            ty.align()
        ),
        InstKind::Store { value, ptr } => write!(
            out,
            "store {}, ptr {}, align {}",
            typed(*value),
            operand(*ptr),
            body.value_type(*value).align()
        ),
        InstKind::Binary { op, lhs, rhs } => write!(
            out,
            "{} double {}, {}",
            op.opcode(),
            operand(*lhs),
            operand(*rhs)
        ),
        InstKind::FCmp { pred, lhs, rhs } => write!(
            out,
            "fcmp {} double {}, {}",
            pred.keyword(),
            operand(*lhs),
            operand(*rhs)
        ),
        InstKind::UiToFp { value } => write!(out, "uitofp {} to double", typed(*value)),
        InstKind::Call { callee, args } => {
            let target = &module.functions[*callee];
            let signature = &target.signature;
            let fn_ty = if signature.variadic {
                let mut params = signature
                    .params
                    .iter()
                    .map(|ty| ty.as_str())
                    .collect::<Vec<_>>();
                params.push("...");
                format!("{} ({})", signature.ret.as_str(), params.join(", "))
            } else {
                signature.ret.as_str().to_string()
            };
            let args = args.iter().map(|arg| typed(*arg)).collect::<Vec<_>>();
            write!(out, "call {fn_ty} @{}({})", target.name, args.join(", "))
        }
        InstKind::Ret { value: Some(value) } => write!(out, "ret {}", typed(*value)),
        InstKind::Ret { value: None } => write!(out, "ret {}", IrType::Void.as_str()),
    }
}

fn render_value(module: &Module, body: &Body, value: Value) -> String {
    match value {
        Value::Double(val) => format_double(val),
        Value::I32(val) => val.to_string(),
        Value::Global(id) => format!("@{}", module.globals[id].number),
        Value::Inst(id) => match &body.instructions[id].name {
            Some(name) => local_name(name),
            None => "<unnamed>".to_string(),
        },
    }
}

/// Format a double the way LLVM's assembly writer does
///
/// Six-digit scientific notation when it parses back to the same value,
/// otherwise the exact bit pattern in hex.
pub fn format_double(value: f64) -> String {
    if value.is_finite() {
        let sci = format!("{value:.6e}");
        if let Some((mantissa, exponent)) = sci.split_once('e') {
            if let Ok(exp) = exponent.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                let text = format!("{mantissa}e{sign}{:02}", exp.abs());
                if text.parse::<f64>().is_ok_and(|parsed| parsed.to_bits() == value.to_bits()) {
                    return text;
                }
            }
        }
    }
    format!("0x{:016X}", value.to_bits())
}

/// Render a local value name as `%name`, quoting it when it is not a bare identifier
///
/// Bare names match `[-a-zA-Z$._][-a-zA-Z$._0-9]*`; anything else, such as
/// a non-ASCII variable, is written `%"..."` with its bytes escaped.
pub fn local_name(name: &str) -> String {
    let bare = match name.as_bytes().split_first() {
        Some((first, rest)) => {
            is_name_byte(*first) && !first.is_ascii_digit() && rest.iter().all(|byte| is_name_byte(*byte))
        }
        None => false,
    };
    if bare {
        format!("%{name}")
    } else {
        format!("%\"{}\"", escape_bytes(name.as_bytes()))
    }
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'$' | b'.' | b'_')
}

/// Escape bytes for an LLVM `c"..."` string literal
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        if (byte.is_ascii_graphic() || byte == b' ') && byte != b'"' && byte != b'\\' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("\\{byte:02X}"));
        }
    }
    out
}
