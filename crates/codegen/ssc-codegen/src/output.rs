//! `printf` lowering

use crate::context::Compilation;
use crate::error::EmitError;
use ssc_ir::{FuncId, Function, IrType, Signature, Value};
use tracing::debug;

/// Symbol of the external print function
pub const PRINTF: &str = "printf";

/// Format used for string prints
pub const STRING_FORMAT: &str = "%s\n";

/// Format used for number prints
pub const NUMBER_FORMAT: &str = "%f\n";

impl Compilation {
    /// Print a literal string followed by a newline
    ///
    /// The text becomes its own null-terminated global; the newline comes
    /// from the `"%s\n"` format.
    ///
    /// # Errors
    /// Returns [`EmitError::Build`] if the entry block is already closed
    pub fn print_literal_string(&mut self, text: &str) -> Result<Value, EmitError> {
        let global = self.module.add_global_string(text.as_bytes());
        self.formatted_print(STRING_FORMAT, Value::Global(global))
    }

    /// Print a number with `"%f\n"`
    ///
    /// # Errors
    /// Returns [`EmitError::Build`] if the entry block is already closed
    pub fn print_number(&mut self, value: Value) -> Result<Value, EmitError> {
        let value = self.as_double(value)?;
        self.formatted_print(NUMBER_FORMAT, value)
    }

    /// Call `printf(format, value)`, declaring `printf` on first use
    ///
    /// Each call gets a fresh global for `format`.
    ///
    /// # Errors
    /// Returns [`EmitError::Build`] if the entry block is already closed
    pub fn formatted_print(&mut self, format: &str, value: Value) -> Result<Value, EmitError> {
        let printf = self.printf_declaration();
        let format = self.module.add_global_string(format.as_bytes());
        let call = self.builder.build_call(
            &mut self.module,
            printf,
            vec![Value::Global(format), value],
            "printfCall",
        )?;
        Ok(call)
    }

    /// `declare i32 @printf(ptr, ...)`, created once per module
    fn printf_declaration(&mut self) -> FuncId {
        if let Some(printf) = self.printf {
            return printf;
        }
        let printf = self.module.get_function(PRINTF).unwrap_or_else(|| {
            debug!("declaring external printf");
            self.module.add_function(Function {
                name: PRINTF.to_string(),
                signature: Signature {
                    ret: IrType::I32,
                    params: vec![IrType::Ptr],
                    variadic: true,
                },
                body: None,
            })
        });
        self.printf = Some(printf);
        printf
    }
}

#[cfg(test)]
mod tests {
    use crate::{CompileOptions, Compilation};
    use ssc_interpreter::Interpreter;
    use ssc_ir::{InstKind, Value};

    fn call_count(c: &Compilation) -> usize {
        c.module().functions[c.entry]
            .body
            .as_ref()
            .unwrap()
            .iter()
            .filter(|(_, inst)| matches!(inst.kind, InstKind::Call { .. }))
            .count()
    }

    #[test]
    fn test_printf_declared_once() {
        let mut c = Compilation::new(CompileOptions::default()).unwrap();
        c.print_literal_string("first").unwrap();
        c.print_literal_string("second").unwrap();
        assert_eq!(c.module().declaration_count(), 1);
        assert_eq!(call_count(&c), 2);
    }

    #[test]
    fn test_string_global_has_no_newline() {
        let mut c = Compilation::new(CompileOptions::default()).unwrap();
        c.print_literal_string("hello").unwrap();
        let contents: Vec<_> = c
            .module()
            .globals
            .iter()
            .map(|(_, global)| global.bytes.clone())
            .collect();
        assert_eq!(contents, vec![b"hello".to_vec(), b"%s\n".to_vec()]);
    }

    #[test]
    fn test_print_output() {
        let mut c = Compilation::new(CompileOptions::default()).unwrap();
        c.print_literal_string("hello").unwrap();
        c.print_number(Value::Double(-2.25)).unwrap();
        let module = c.finish().unwrap().into_module();
        let run = Interpreter::new().run(&module).unwrap();
        assert_eq!(run.stdout, "hello\n-2.250000\n");
        assert_eq!(run.exit_code, 0);
    }
}
