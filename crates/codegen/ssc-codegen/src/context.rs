//! Compilation context: module scaffold, insertion point and variable storage

use crate::error::EmitError;
use crate::options::{CompileOptions, UninitPolicy};
use crate::symbols::{SlotId, SymbolTable};
use ssc_intern::Interner;
use ssc_ir::{Body, FuncId, Function, FunctionBuilder, IrType, Module, Signature, Value};
use std::io::{self, Write};
use tracing::{debug, warn};

/// Name of the synthetic entry function
pub const ENTRY_FUNCTION: &str = "main";

/// Label of the entry function's only block
pub const ENTRY_BLOCK: &str = "entry";

/// State of one single-pass compilation
///
/// Creating a `Compilation` sets up the module, `main` and its `entry` block
/// with the insertion point fixed at the end of that block. Parser actions
/// then emit into it in source order. [`Compilation::finish`] closes `main`
/// with `ret i32 0` and is the only way to reach serialization.
#[derive(Debug)]
pub struct Compilation {
    pub(crate) options: CompileOptions,
    pub(crate) interner: Interner,
    pub(crate) module: Module,
    pub(crate) entry: FuncId,
    pub(crate) builder: FunctionBuilder,
    pub(crate) symbols: SymbolTable,
    pub(crate) printf: Option<FuncId>,
}

impl Compilation {
    /// Create the module and the entry function scaffold
    ///
    /// # Errors
    /// Returns [`EmitError::Build`] if the entry block cannot be created
    pub fn new(options: CompileOptions) -> Result<Self, EmitError> {
        let mut module = Module::new(options.module_name.clone());
        let entry = module.add_function(Function {
            name: ENTRY_FUNCTION.to_string(),
            signature: Signature {
                ret: IrType::I32,
                params: Vec::new(),
                variadic: false,
            },
            body: Some(Body::default()),
        });
        let block = FunctionBuilder::append_block(&mut module, entry, ENTRY_BLOCK)?;
        debug!(module = %options.module_name, "initialized entry function");

        Ok(Self {
            options,
            interner: Interner::new(),
            module,
            entry,
            builder: FunctionBuilder::at_end(entry, block),
            symbols: SymbolTable::new(),
            printf: None,
        })
    }

    /// Module built so far
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Variable slots allocated so far
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Resolve a variable name to its interned symbol
    pub fn variable_name(&self, slot: SlotId) -> &str {
        self.interner.resolve(self.symbols.get(slot).name)
    }

    /// A `double` constant value handle
    pub fn double_constant(&self, value: f64) -> Value {
        Value::Double(value)
    }

    /// Slot for `name`, allocating `alloca double` on first use
    ///
    /// # Errors
    /// Returns [`EmitError::Build`] if the entry block is already closed
    pub fn resolve(&mut self, name: &str) -> Result<SlotId, EmitError> {
        let sym = self.interner.intern(name);
        if let Some(slot) = self.symbols.lookup(sym) {
            return Ok(slot);
        }
        let ptr = self.builder.build_alloca(&mut self.module, IrType::Double, name)?;
        let slot = self.symbols.register(sym, ptr);
        debug!(name, "allocated variable slot");
        Ok(slot)
    }

    /// Store `value` into the slot for `name`
    ///
    /// Comparison results are widened to `0.0`/`1.0` first.
    ///
    /// # Errors
    /// Returns [`EmitError::Build`] if the entry block is already closed
    pub fn write(&mut self, name: &str, value: Value) -> Result<(), EmitError> {
        let slot = self.resolve(name)?;
        let value = self.as_double(value)?;
        let ptr = self.symbols.get(slot).ptr;
        self.builder.build_store(&mut self.module, value, ptr)?;
        self.symbols.mark_written(slot);
        Ok(())
    }

    /// Load the current value of `name`
    ///
    /// Reading a name that was never written follows the configured
    /// [`UninitPolicy`]. Under [`UninitPolicy::Preserve`] the warning is
    /// logged once per name.
    ///
    /// # Errors
    /// Returns [`EmitError::UninitializedRead`] under [`UninitPolicy::Error`],
    /// or [`EmitError::Build`] if the entry block is already closed
    pub fn read(&mut self, name: &str) -> Result<Value, EmitError> {
        let slot = self.resolve(name)?;
        let ptr = self.symbols.get(slot).ptr;
        let state = self.symbols.get(slot);
        if !state.written && !state.warned {
            match self.options.uninit_reads {
                UninitPolicy::Preserve => {
                    warn!(name, "variable read before assignment, value is unspecified");
                    self.symbols.mark_warned(slot);
                }
                UninitPolicy::ZeroInit => {
                    debug!(name, "zero-initializing variable read before assignment");
                    self.builder.build_store(&mut self.module, Value::Double(0.0), ptr)?;
                    self.symbols.mark_written(slot);
                }
                UninitPolicy::Error => {
                    return Err(EmitError::UninitializedRead {
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(self
            .builder
            .build_load(&mut self.module, IrType::Double, ptr, name)?)
    }

    /// Type of an already emitted value
    pub fn value_type(&self, value: Value) -> IrType {
        self.module.functions[self.entry]
            .body
            .as_ref()
            .map_or(IrType::Void, |body| body.value_type(value))
    }

    /// Widen an `i1` comparison result to `double`; other values pass through
    pub(crate) fn as_double(&mut self, value: Value) -> Result<Value, EmitError> {
        if self.value_type(value) == IrType::I1 {
            Ok(self.builder.build_ui_to_fp(&mut self.module, value, "booltmp")?)
        } else {
            Ok(value)
        }
    }

    /// Close the entry function with `ret i32 0`
    ///
    /// # Errors
    /// Returns [`EmitError::Build`] if the return cannot be appended
    pub fn finish(self) -> Result<FinishedModule, EmitError> {
        let Self {
            mut module,
            builder,
            symbols,
            ..
        } = self;
        builder.build_return(&mut module, Some(Value::I32(0)))?;
        debug!(slots = symbols.len(), "finalized entry function");
        Ok(FinishedModule { module })
    }
}

/// A closed module, ready to be printed once
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedModule {
    module: Module,
}

impl FinishedModule {
    /// The finished module
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Take the module out, e.g. to execute it
    pub fn into_module(self) -> Module {
        self.module
    }

    /// Write the module as textual LLVM IR to `sink`
    ///
    /// # Errors
    /// Propagates write failures of `sink`
    pub fn serialize<W: Write + ?Sized>(self, sink: &mut W) -> io::Result<()> {
        write!(sink, "{}", self.module)?;
        sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssc_ir::InstKind;

    fn count(module: &Module, pred: impl Fn(&InstKind) -> bool) -> usize {
        module
            .functions
            .iter()
            .filter_map(|(_, func)| func.body.as_ref())
            .flat_map(|body| body.iter())
            .filter(|(_, inst)| pred(&inst.kind))
            .count()
    }

    #[test]
    fn test_scaffold_has_single_block() {
        let compilation = Compilation::new(CompileOptions::default()).unwrap();
        let module = compilation.module();
        let main = module.get_function(ENTRY_FUNCTION).unwrap();
        let body = module.functions[main].body.as_ref().unwrap();
        assert_eq!(body.blocks.len(), 1);
        assert_eq!(body.blocks[0].label, ENTRY_BLOCK);
        assert!(body.blocks[0].instructions.is_empty());
    }

    #[test]
    fn test_resolve_allocates_once_per_name() {
        let mut compilation = Compilation::new(CompileOptions::default()).unwrap();
        let first = compilation.resolve("x").unwrap();
        let again = compilation.resolve("x").unwrap();
        let upper = compilation.resolve("X").unwrap();
        assert_eq!(first, again);
        assert_ne!(first, upper);
        assert_eq!(compilation.symbols().len(), 2);
        assert_eq!(count(compilation.module(), |k| matches!(k, InstKind::Alloca { .. })), 2);
        assert_eq!(compilation.variable_name(upper), "X");
    }

    #[test]
    fn test_write_reuses_slot() {
        let mut compilation = Compilation::new(CompileOptions::default()).unwrap();
        compilation.write("x", Value::Double(1.0)).unwrap();
        compilation.write("x", Value::Double(2.0)).unwrap();
        let module = compilation.module();
        assert_eq!(count(module, |k| matches!(k, InstKind::Alloca { .. })), 1);
        assert_eq!(count(module, |k| matches!(k, InstKind::Store { .. })), 2);
    }

    #[test]
    fn test_uninit_read_policies() {
        let options = CompileOptions::default().with_uninit_reads(UninitPolicy::Error);
        let mut strict = Compilation::new(options).unwrap();
        assert_eq!(
            strict.read("ghost").unwrap_err(),
            EmitError::UninitializedRead {
                name: "ghost".to_string()
            }
        );

        let options = CompileOptions::default().with_uninit_reads(UninitPolicy::Preserve);
        let mut preserve = Compilation::new(options).unwrap();
        preserve.read("ghost").unwrap();
        assert_eq!(count(preserve.module(), |k| matches!(k, InstKind::Store { .. })), 0);

        let mut zeroed = Compilation::new(CompileOptions::default()).unwrap();
        zeroed.read("ghost").unwrap();
        zeroed.read("ghost").unwrap();
        assert_eq!(count(zeroed.module(), |k| matches!(k, InstKind::Store { .. })), 1);
        assert_eq!(count(zeroed.module(), |k| matches!(k, InstKind::Load { .. })), 2);
    }

    #[test]
    fn test_preserved_uninit_read_warns_once() {
        let options = CompileOptions::default().with_uninit_reads(UninitPolicy::Preserve);
        let mut compilation = Compilation::new(options).unwrap();
        compilation.read("ghost").unwrap();
        let slot = compilation.resolve("ghost").unwrap();
        assert!(compilation.symbols().get(slot).warned);
        assert!(!compilation.symbols().get(slot).written);

        compilation.read("ghost").unwrap();
        let module = compilation.module();
        assert_eq!(count(module, |k| matches!(k, InstKind::Load { .. })), 2);
        assert_eq!(count(module, |k| matches!(k, InstKind::Store { .. })), 0);
    }

    #[test]
    fn test_write_keeps_full_precision() {
        let mut compilation = Compilation::new(CompileOptions::default()).unwrap();
        compilation.write("pi", Value::Double(std::f64::consts::PI)).unwrap();
        compilation.write("tenth", Value::Double(0.1)).unwrap();
        compilation.read("pi").unwrap();

        let mut out = Vec::new();
        compilation.finish().unwrap().serialize(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("store double 0x400921FB54442D18, ptr %pi, align 8"));
        assert!(text.contains("store double 1.000000e-01, ptr %tenth, align 8"));
        assert!(text.contains("%pi1 = load double, ptr %pi, align 8"));
    }

    #[test]
    fn test_finish_appends_single_return() {
        let mut compilation = Compilation::new(CompileOptions::default()).unwrap();
        compilation.write("x", Value::Double(1.0)).unwrap();
        let finished = compilation.finish().unwrap();
        let module = finished.module();
        assert_eq!(count(module, |k| matches!(k, InstKind::Ret { .. })), 1);

        let main = module.get_function(ENTRY_FUNCTION).unwrap();
        let body = module.functions[main].body.as_ref().unwrap();
        let last = body.blocks[0].terminator(body).unwrap();
        assert_eq!(last.kind, InstKind::Ret { value: Some(Value::I32(0)) });
    }

    #[test]
    fn test_serialize_writes_module_text() {
        let compilation = Compilation::new(CompileOptions::default().with_module_name("demo")).unwrap();
        let mut out = Vec::new();
        compilation.finish().unwrap().serialize(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("; ModuleID = 'demo'\n"));
        assert!(text.contains("define i32 @main() {\nentry:\n  ret i32 0\n}\n"));
    }
}
