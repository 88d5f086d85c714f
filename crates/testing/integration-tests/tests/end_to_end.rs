//! Whole-pipeline checks on emitted IR and its execution

use expect_test::expect;
use integration_tests::{TestFixture, compile_module, execute};
use ssc_codegen::{CompileOptions, EmitError, UninitPolicy};
use ssc_interpreter::{Interpreter, InterpreterError};
use ssc_parser::ParseError;

fn emit(source: &str) -> String {
    compile_module(source).unwrap().to_string()
}

#[test]
fn test_sum_program() {
    let source = "x = 3.5\ny = 2.0\nz = x + y\nprint z\n";
    let ir = emit(source);

    expect![[r#"
        ; ModuleID = 'top'
        source_filename = "top"

        @0 = private unnamed_addr constant [4 x i8] c"%f\0A\00", align 1

        define i32 @main() {
        entry:
          %x = alloca double, align 8
          store double 3.500000e+00, ptr %x, align 8
          %y = alloca double, align 8
          store double 2.000000e+00, ptr %y, align 8
          %x1 = load double, ptr %x, align 8
          %y2 = load double, ptr %y, align 8
          %fadd = fadd double %x1, %y2
          %z = alloca double, align 8
          store double %fadd, ptr %z, align 8
          %z3 = load double, ptr %z, align 8
          %printfCall = call i32 (ptr, ...) @printf(ptr @0, double %z3)
          ret i32 0
        }

        declare i32 @printf(ptr, ...)
    "#]]
    .assert_eq(&ir);

    for name in ["x", "y", "z"] {
        assert_eq!(ir.matches(&format!("%{name} = alloca double")).count(), 1);
    }
    assert_eq!(ir.matches("ret i32").count(), 1);

    let run = execute(source).unwrap();
    assert_eq!(run.stdout, "5.500000\n");
    assert_eq!(run.exit_code, 0);
}

#[test]
fn test_hello_program() {
    let module = compile_module("print \"hello\"\n").unwrap();
    let contents: Vec<_> = module
        .globals
        .iter()
        .map(|(_, global)| global.bytes.clone())
        .collect();
    assert_eq!(contents, vec![b"hello".to_vec(), b"%s\n".to_vec()]);

    expect![[r#"
        ; ModuleID = 'top'
        source_filename = "top"

        @0 = private unnamed_addr constant [6 x i8] c"hello\00", align 1
        @1 = private unnamed_addr constant [4 x i8] c"%s\0A\00", align 1

        define i32 @main() {
        entry:
          %printfCall = call i32 (ptr, ...) @printf(ptr @1, ptr @0)
          ret i32 0
        }

        declare i32 @printf(ptr, ...)
    "#]]
    .assert_eq(&module.to_string());

    let run = Interpreter::new().run(&module).unwrap();
    assert_eq!(run.stdout, "hello\n");
}

#[test]
fn test_two_prints_share_one_declaration() {
    let ir = emit("print \"one\"\nprint \"two\"\n");
    assert_eq!(ir.matches("declare i32 @printf").count(), 1);
    assert_eq!(ir.matches("call i32 (ptr, ...) @printf").count(), 2);
    assert_eq!(ir.matches("c\"%s\\0A\\00\"").count(), 2);
}

#[test]
fn test_empty_program() {
    let ir = emit("");
    assert!(ir.contains("define i32 @main() {\nentry:\n  ret i32 0\n}\n"));
    assert!(!ir.contains("declare"));
    assert_eq!(execute("").unwrap().stdout, "");
}

#[test]
fn test_slots_are_reused_per_name() {
    let ir = emit("x = 1\nx = 2\nx = x + 1\n");
    assert_eq!(ir.matches("alloca double").count(), 1);

    let ir = emit("x = 1\nX = 2\n");
    assert_eq!(ir.matches("alloca double").count(), 2);
}

#[test]
fn test_values_survive_storage() {
    let run = execute("a = 0\nb = -42.75\nc = 123456789.125\nprint a\nprint b\nprint c\n").unwrap();
    assert_eq!(run.stdout, "0.000000\n-42.750000\n123456789.125000\n");
}

#[test]
fn test_full_precision_survives_storage() {
    let source = "pi = 3.141592653589793\ntenth = 0.1\ncopy = pi\nsum = tenth + 0.2\n";
    let ir = emit(source);
    assert!(ir.contains("store double 0x400921FB54442D18, ptr %pi, align 8"));

    let run = execute(source).unwrap();
    let bits = |name: &str| run.slot_double(name).map(f64::to_bits);
    assert_eq!(bits("pi"), Some(std::f64::consts::PI.to_bits()));
    assert_eq!(bits("copy"), Some(std::f64::consts::PI.to_bits()));
    assert_eq!(bits("tenth"), Some(0.1_f64.to_bits()));
    assert_eq!(bits("sum"), Some((0.1_f64 + 0.2).to_bits()));
}

#[test]
fn test_variable_named_like_block_label() {
    let ir = emit("entry = 1\nprint entry\n");
    assert!(ir.contains("entry:\n"));
    assert!(!ir.contains("%entry = "));
    assert!(ir.contains("%entry1 = alloca double, align 8"));
    assert!(ir.contains("store double 1.000000e+00, ptr %entry1, align 8"));
    assert_eq!(execute("entry = 1\nprint entry\n").unwrap().stdout, "1.000000\n");
}

#[test]
fn test_non_ascii_variable_names_are_quoted() {
    let source = "π = 3.14\nprint π\n";
    let ir = emit(source);
    assert!(ir.contains("%\"\\CF\\80\" = alloca double, align 8"));
    assert!(ir.contains("ptr %\"\\CF\\80\", align 8"));
    assert!(!ir.contains("%π"));
    assert_eq!(execute(source).unwrap().stdout, "3.140000\n");
}

#[test]
fn test_unsupported_operator_produces_no_module() {
    for source in ["x = 5 % 2\n", "print 2 ^ 8\n", "print 1 == 1\n"] {
        let err = compile_module(source).unwrap_err();
        let parse = err.downcast_ref::<ParseError>().unwrap();
        assert!(matches!(
            parse.emit_error(),
            Some(EmitError::UnsupportedOperator { .. })
        ));
    }
}

#[test]
fn test_uninitialized_read_policies() {
    let source = "print ghost\n";

    let zero = ssc_driver::run_source(source, "ghost.ssc", &CompileOptions::default()).unwrap();
    assert_eq!(zero.stdout, "0.000000\n");

    let preserve = CompileOptions::default().with_uninit_reads(UninitPolicy::Preserve);
    let module = ssc_parser::compile(source, "ghost.ssc", preserve)
        .unwrap()
        .into_module();
    assert!(!module.to_string().contains("store"));
    assert_eq!(
        Interpreter::new().run(&module).unwrap_err(),
        InterpreterError::UninitializedLoad("ghost".to_string())
    );

    let strict = CompileOptions::default().with_uninit_reads(UninitPolicy::Error);
    let err = ssc_parser::compile(source, "ghost.ssc", strict).unwrap_err();
    assert_eq!(
        err.emit_error(),
        Some(&EmitError::UninitializedRead {
            name: "ghost".to_string()
        })
    );
}

#[test]
fn test_build_with_project_config() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .add_file("ssc.toml", "[compile]\nmodule-name = \"calc\"\n")
        .unwrap();
    let script = fixture.add_file("calc.ssc", "print 6 * 7\n").unwrap();

    let config = ssc_driver::Config::for_script(&script, None).unwrap();
    let output = ssc_driver::default_output_path(&script);
    ssc_driver::build_file(&script, &output, &config.compile).unwrap();

    let ir = std::fs::read_to_string(output).unwrap();
    assert!(ir.starts_with("; ModuleID = 'calc'\nsource_filename = \"calc\"\n"));
    assert!(ir.contains("fmul double 6.000000e+00, 7.000000e+00"));
}
