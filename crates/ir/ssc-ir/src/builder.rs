//! Instruction builder
//!
//! Mirrors an LLVM `IRBuilder`: a cursor at the end of one block of one
//! function. The builder does not borrow the module; every emission takes
//! `&mut Module` so the module can live next to the builder in one context.

use crate::{
    BasicBlock, BlockId, Body, FloatBinOp, FloatPredicate, FuncId, InstId, InstKind, Instruction,
    IrType, Module, Value,
};
use thiserror::Error;
use tracing::trace;

/// Errors raised while inserting instructions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The target function is an external declaration
    #[error("function `{0}` has no body to insert into")]
    NoBody(String),
    /// The insertion block already ends with a terminator
    #[error("block `{0}` is already terminated")]
    BlockTerminated(String),
    /// An operand has the wrong type for the instruction
    #[error("type mismatch in `{opcode}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Instruction being built
        opcode: &'static str,
        /// Expected operand type
        expected: &'static str,
        /// Actual operand type
        found: &'static str,
    },
    /// Call arguments do not match the callee signature
    #[error("call to `{callee}` passes {found} arguments, signature needs {expected}")]
    ArityMismatch {
        /// Callee name
        callee: String,
        /// Minimum argument count
        expected: usize,
        /// Actual argument count
        found: usize,
    },
}

/// Insertion cursor positioned at the end of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionBuilder {
    func: FuncId,
    block: BlockId,
}

impl FunctionBuilder {
    /// Position a builder at the end of `block` in `func`
    pub fn at_end(func: FuncId, block: BlockId) -> Self {
        Self { func, block }
    }

    /// Append a new empty block to `func`
    ///
    /// Labels share the function's local namespace with values, so the
    /// label is uniqued like any other name.
    ///
    /// # Errors
    /// Returns [`BuildError::NoBody`] if `func` is a declaration
    pub fn append_block(module: &mut Module, func: FuncId, label: &str) -> Result<BlockId, BuildError> {
        let body = body_mut(module, func)?;
        let label = body.names.claim(label);
        body.blocks.push(BasicBlock {
            label,
            instructions: Vec::new(),
        });
        Ok(body.blocks.len() - 1)
    }

    /// Function this builder inserts into
    pub fn function(&self) -> FuncId {
        self.func
    }

    /// Block this builder inserts into
    pub fn block(&self) -> BlockId {
        self.block
    }

    /// `%name = alloca ty`
    pub fn build_alloca(&self, module: &mut Module, ty: IrType, name: &str) -> Result<Value, BuildError> {
        self.insert(module, InstKind::Alloca { ty }, IrType::Ptr, Some(name))
            .map(Value::Inst)
    }

    /// `%name = load ty, ptr %ptr`
    pub fn build_load(
        &self,
        module: &mut Module,
        ty: IrType,
        ptr: Value,
        name: &str,
    ) -> Result<Value, BuildError> {
        self.expect_type(module, "load", ptr, IrType::Ptr)?;
        self.insert(module, InstKind::Load { ty, ptr }, ty, Some(name))
            .map(Value::Inst)
    }

    /// `store ty %value, ptr %ptr`
    pub fn build_store(&self, module: &mut Module, value: Value, ptr: Value) -> Result<InstId, BuildError> {
        self.expect_type(module, "store", ptr, IrType::Ptr)?;
        self.insert(module, InstKind::Store { value, ptr }, IrType::Void, None)
    }

    /// `%name = f{add,sub,mul,div} double %lhs, %rhs`
    pub fn build_float_binop(
        &self,
        module: &mut Module,
        op: FloatBinOp,
        lhs: Value,
        rhs: Value,
        name: &str,
    ) -> Result<Value, BuildError> {
        self.expect_type(module, op.opcode(), lhs, IrType::Double)?;
        self.expect_type(module, op.opcode(), rhs, IrType::Double)?;
        self.insert(module, InstKind::Binary { op, lhs, rhs }, IrType::Double, Some(name))
            .map(Value::Inst)
    }

    /// `%name = fcmp pred double %lhs, %rhs`
    pub fn build_fcmp(
        &self,
        module: &mut Module,
        pred: FloatPredicate,
        lhs: Value,
        rhs: Value,
        name: &str,
    ) -> Result<Value, BuildError> {
        self.expect_type(module, "fcmp", lhs, IrType::Double)?;
        self.expect_type(module, "fcmp", rhs, IrType::Double)?;
        self.insert(module, InstKind::FCmp { pred, lhs, rhs }, IrType::I1, Some(name))
            .map(Value::Inst)
    }

    /// `%name = uitofp i1 %value to double`
    pub fn build_ui_to_fp(&self, module: &mut Module, value: Value, name: &str) -> Result<Value, BuildError> {
        self.expect_type(module, "uitofp", value, IrType::I1)?;
        self.insert(module, InstKind::UiToFp { value }, IrType::Double, Some(name))
            .map(Value::Inst)
    }

    /// `%name = call ret (sig) @callee(args...)`
    pub fn build_call(
        &self,
        module: &mut Module,
        callee: FuncId,
        args: Vec<Value>,
        name: &str,
    ) -> Result<Value, BuildError> {
        let target = &module.functions[callee];
        let signature = target.signature.clone();
        let arity_ok = if signature.variadic {
            args.len() >= signature.params.len()
        } else {
            args.len() == signature.params.len()
        };
        if !arity_ok {
            return Err(BuildError::ArityMismatch {
                callee: target.name.clone(),
                expected: signature.params.len(),
                found: args.len(),
            });
        }
        for (arg, param) in args.iter().zip(&signature.params) {
            self.expect_type(module, "call", *arg, *param)?;
        }
        let hint = (signature.ret != IrType::Void).then_some(name);
        self.insert(module, InstKind::Call { callee, args }, signature.ret, hint)
            .map(Value::Inst)
    }

    /// `ret ty %value` or `ret void`
    pub fn build_return(&self, module: &mut Module, value: Option<Value>) -> Result<InstId, BuildError> {
        if let Some(value) = value {
            let expected = module.functions[self.func].signature.ret;
            self.expect_type(module, "ret", value, expected)?;
        }
        self.insert(module, InstKind::Ret { value }, IrType::Void, None)
    }

    fn expect_type(
        &self,
        module: &Module,
        opcode: &'static str,
        value: Value,
        expected: IrType,
    ) -> Result<(), BuildError> {
        let body = body_ref(module, self.func)?;
        let found = body.value_type(value);
        if found == expected {
            Ok(())
        } else {
            Err(BuildError::TypeMismatch {
                opcode,
                expected: expected.as_str(),
                found: found.as_str(),
            })
        }
    }

    fn insert(
        &self,
        module: &mut Module,
        kind: InstKind,
        ty: IrType,
        name_hint: Option<&str>,
    ) -> Result<InstId, BuildError> {
        let body = body_mut(module, self.func)?;
        let block = &body.blocks[self.block];
        if block.terminator(body).is_some() {
            return Err(BuildError::BlockTerminated(block.label.clone()));
        }

        let name = name_hint.map(|hint| body.names.claim(hint));
        trace!(?kind, ?name, "insert instruction");
        let id = body.instructions.alloc(Instruction { kind, ty, name });
        body.blocks[self.block].instructions.push(id);
        Ok(id)
    }
}

fn body_ref(module: &Module, func: FuncId) -> Result<&Body, BuildError> {
    let function = &module.functions[func];
    function
        .body
        .as_ref()
        .ok_or_else(|| BuildError::NoBody(function.name.clone()))
}

fn body_mut(module: &mut Module, func: FuncId) -> Result<&mut Body, BuildError> {
    let function = &mut module.functions[func];
    match function.body.as_mut() {
        Some(body) => Ok(body),
        None => Err(BuildError::NoBody(function.name.clone())),
    }
}
