//! SSC Intermediate Representation
//!
//! A small, typed, LLVM-shaped IR. A [`Module`] owns functions and global
//! string constants; a function body owns its instructions in an arena and
//! lists them per basic block in emission order.
//!
//! The IR is deliberately close to LLVM IR so that [`printer`] can render it
//! as textual `.ll` that `clang`/`llc` accept unchanged.

#![allow(missing_docs, reason = "Instruction fields follow LLVM operand naming")]

pub mod builder;
pub mod printer;

pub use builder::FunctionBuilder;

use la_arena::{Arena, Idx};
use rustc_hash::{FxHashMap, FxHashSet};

/// First-class IR types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    /// Boolean produced by comparisons
    I1,
    /// 32-bit integer (entry return code, `printf` result)
    I32,
    /// IEEE-754 double, the only source-level scalar type
    Double,
    /// Opaque pointer
    Ptr,
    /// No value
    Void,
}

impl IrType {
    /// LLVM spelling of the type
    pub fn as_str(self) -> &'static str {
        match self {
            Self::I1 => "i1",
            Self::I32 => "i32",
            Self::Double => "double",
            Self::Ptr => "ptr",
            Self::Void => "void",
        }
    }

    /// ABI alignment used on loads, stores and allocas
    pub fn align(self) -> u32 {
        match self {
            Self::I1 => 1,
            Self::I32 => 4,
            Self::Double | Self::Ptr => 8,
            Self::Void => 0,
        }
    }
}

/// Instruction handle inside a function body
pub type InstId = Idx<Instruction>;

/// Global constant handle inside a module
pub type GlobalId = Idx<Global>;

/// Function handle inside a module
pub type FuncId = Idx<Function>;

/// Basic block index inside a function body
pub type BlockId = usize;

/// An immutable handle to a computed or constant value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Double-precision constant
    Double(f64),
    /// 32-bit integer constant
    I32(i32),
    /// Result of an instruction
    Inst(InstId),
    /// Address of a global constant
    Global(GlobalId),
}

/// Floating-point binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatBinOp {
    /// `fadd`
    Add,
    /// `fsub`
    Sub,
    /// `fmul`
    Mul,
    /// `fdiv`
    Div,
}

impl FloatBinOp {
    /// LLVM opcode
    pub fn opcode(self) -> &'static str {
        match self {
            Self::Add => "fadd",
            Self::Sub => "fsub",
            Self::Mul => "fmul",
            Self::Div => "fdiv",
        }
    }

    /// Evaluate with IEEE-754 double semantics
    pub fn eval(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
        }
    }
}

/// Floating-point comparison predicates
///
/// Only the unordered forms are emitted: they hold when the relation holds
/// or when either operand is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatPredicate {
    /// Unordered or greater than
    Ugt,
    /// Unordered or less than
    Ult,
}

impl FloatPredicate {
    /// LLVM predicate keyword
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Ugt => "ugt",
            Self::Ult => "ult",
        }
    }

    /// Evaluate the predicate
    pub fn eval(self, lhs: f64, rhs: f64) -> bool {
        if lhs.is_nan() || rhs.is_nan() {
            return true;
        }
        match self {
            Self::Ugt => lhs > rhs,
            Self::Ult => lhs < rhs,
        }
    }
}

/// Instruction payload
#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    /// Stack slot of `ty`
    Alloca { ty: IrType },
    /// Load a `ty` from `ptr`
    Load { ty: IrType, ptr: Value },
    /// Store `value` to `ptr`
    Store { value: Value, ptr: Value },
    /// Floating-point arithmetic
    Binary {
        op: FloatBinOp,
        lhs: Value,
        rhs: Value,
    },
    /// Floating-point comparison producing `i1`
    FCmp {
        pred: FloatPredicate,
        lhs: Value,
        rhs: Value,
    },
    /// Unsigned integer to double conversion
    UiToFp { value: Value },
    /// Direct call
    Call { callee: FuncId, args: Vec<Value> },
    /// Return from the function
    Ret { value: Option<Value> },
}

impl InstKind {
    /// Whether this instruction ends a basic block
    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::Ret { .. })
    }
}

/// A single instruction with its result type and unique name
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstKind,
    /// Result type (`Void` for stores and returns)
    pub ty: IrType,
    /// Unique local name, present for every value-producing instruction
    pub name: Option<String>,
}

/// A straight-line sequence of instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<InstId>,
}

impl BasicBlock {
    /// The terminator, if the block has been closed
    pub fn terminator<'body>(&self, body: &'body Body) -> Option<&'body Instruction> {
        self.instructions
            .last()
            .map(|id| &body.instructions[*id])
            .filter(|inst| inst.kind.is_terminator())
    }
}

/// Local value names, uniquified the way LLVM's symbol tables do it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    used: FxHashSet<String>,
    last_unique: u32,
}

impl NameTable {
    /// Claim a unique name derived from `hint`
    pub fn claim(&mut self, hint: &str) -> String {
        if self.used.insert(hint.to_string()) {
            return hint.to_string();
        }
        loop {
            self.last_unique += 1;
            let candidate = format!("{hint}{}", self.last_unique);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Function body: instruction arena plus blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub instructions: Arena<Instruction>,
    pub blocks: Vec<BasicBlock>,
    pub names: NameTable,
}

impl Body {
    /// Type of a value as seen from this body
    pub fn value_type(&self, value: Value) -> IrType {
        match value {
            Value::Double(_) => IrType::Double,
            Value::I32(_) => IrType::I32,
            Value::Global(_) => IrType::Ptr,
            Value::Inst(id) => self.instructions[id].ty,
        }
    }

    /// Iterate every instruction in block order
    pub fn iter(&self) -> impl Iterator<Item = (InstId, &Instruction)> + '_ {
        self.blocks
            .iter()
            .flat_map(|block| block.instructions.iter())
            .map(|id| (*id, &self.instructions[*id]))
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub ret: IrType,
    pub params: Vec<IrType>,
    pub variadic: bool,
}

/// A defined function or an external declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub signature: Signature,
    /// `None` for external declarations
    pub body: Option<Body>,
}

impl Function {
    /// Whether this is a declaration without a body
    pub fn is_declaration(&self) -> bool {
        self.body.is_none()
    }
}

/// Private, immutable, null-terminated byte-string constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    /// Unnamed globals print as `@N` where N is this number
    pub number: u32,
    /// Contents without the trailing NUL
    pub bytes: Vec<u8>,
}

impl Global {
    /// Array length including the terminator
    pub fn len_with_nul(&self) -> usize {
        self.bytes.len() + 1
    }
}

/// Whole-program IR container
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub globals: Arena<Global>,
    pub functions: Arena<Function>,
    by_name: FxHashMap<String, FuncId>,
}

impl Module {
    /// Create an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            globals: Arena::default(),
            functions: Arena::default(),
            by_name: FxHashMap::default(),
        }
    }

    /// Look up a function or declaration by symbol name
    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.by_name.get(name).copied()
    }

    /// Add a function; a previous function of the same name is shadowed in lookups
    pub fn add_function(&mut self, function: Function) -> FuncId {
        let name = function.name.clone();
        let id = self.functions.alloc(function);
        self.by_name.insert(name, id);
        id
    }

    /// Add a private null-terminated string constant
    pub fn add_global_string(&mut self, bytes: &[u8]) -> GlobalId {
        let number = self.globals.len() as u32;
        self.globals.alloc(Global {
            number,
            bytes: bytes.to_vec(),
        })
    }

    /// Count of external declarations
    pub fn declaration_count(&self) -> usize {
        self.functions
            .iter()
            .filter(|(_, func)| func.is_declaration())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_table_uses_shared_counter() {
        let mut names = NameTable::default();
        assert_eq!(names.claim("x"), "x");
        assert_eq!(names.claim("y"), "y");
        assert_eq!(names.claim("x"), "x1");
        assert_eq!(names.claim("y"), "y2");
        assert_eq!(names.claim("fadd"), "fadd");
    }

    #[test]
    fn test_name_table_skips_taken_suffixes() {
        let mut names = NameTable::default();
        assert_eq!(names.claim("a1"), "a1");
        assert_eq!(names.claim("a"), "a");
        assert_eq!(names.claim("a"), "a2");
    }

    #[test]
    fn test_unordered_predicates_hold_on_nan() {
        assert!(FloatPredicate::Ugt.eval(f64::NAN, 1.0));
        assert!(FloatPredicate::Ult.eval(1.0, f64::NAN));
        assert!(FloatPredicate::Ugt.eval(2.0, 1.0));
        assert!(!FloatPredicate::Ugt.eval(1.0, 2.0));
        assert!(!FloatPredicate::Ult.eval(1.0, 1.0));
    }

    #[test]
    fn test_module_function_lookup() {
        let mut module = Module::new("top");
        let id = module.add_function(Function {
            name: "printf".to_string(),
            signature: Signature {
                ret: IrType::I32,
                params: vec![IrType::Ptr],
                variadic: true,
            },
            body: None,
        });
        assert_eq!(module.get_function("printf"), Some(id));
        assert_eq!(module.get_function("puts"), None);
        assert_eq!(module.declaration_count(), 1);
    }

    #[test]
    fn test_global_numbers_follow_creation_order() {
        let mut module = Module::new("top");
        let first = module.add_global_string(b"hello");
        let second = module.add_global_string(b"%s\n");
        assert_eq!(module.globals[first].number, 0);
        assert_eq!(module.globals[second].number, 1);
        assert_eq!(module.globals[second].len_with_nul(), 4);
    }
}
