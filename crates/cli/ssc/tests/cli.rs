use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn ssc() -> Command {
    let mut cmd = Command::cargo_bin("ssc").unwrap();
    cmd.env_remove("SSC_LOG");
    cmd
}

fn script(dir: &Path, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn test_emit_prints_ir() {
    let dir = TempDir::new().unwrap();
    let path = script(dir.path(), "sum.ssc", "x = 3.5\ny = 2.0\nz = x + y\nprint z\n");

    let output = ssc().arg("emit").arg(&path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("; ModuleID = 'top'"));
    assert!(stdout.contains("fadd double"));
    assert_eq!(stdout.matches("ret i32 0").count(), 1);
}

#[test]
fn test_run_prints_program_output() {
    let dir = TempDir::new().unwrap();
    let path = script(dir.path(), "hello.ssc", "print \"hello\"\nprint 1 / 4\n");

    ssc()
        .arg("run")
        .arg(&path)
        .assert()
        .success()
        .stdout("hello\n0.250000\n");
}

#[test]
fn test_build_writes_ll_file() {
    let dir = TempDir::new().unwrap();
    let path = script(dir.path(), "prog.ssc", "print 1\n");

    ssc().arg("build").arg(&path).assert().success();
    let ir = fs::read_to_string(dir.path().join("prog.ll")).unwrap();
    assert!(ir.contains("declare i32 @printf(ptr, ...)"));

    let custom = dir.path().join("out.ll");
    ssc().arg("build").arg(&path).arg("-o").arg(&custom).assert().success();
    assert!(custom.exists());
}

#[test]
fn test_unsupported_operator_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = script(dir.path(), "bad.ssc", "x = 7 % 2\nprint x\n");

    let output = ssc().arg("emit").arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("illegal binary operation `%`"));

    ssc().arg("build").arg(&path).assert().failure();
    assert!(!dir.path().join("bad.ll").exists());
}

#[test]
fn test_uninit_reads_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ssc.toml"), "[compile]\nuninit-reads = \"error\"\n").unwrap();
    let path = script(dir.path(), "ghost.ssc", "print ghost\n");

    ssc().arg("check").arg(&path).assert().failure();
    ssc()
        .arg("run")
        .arg(&path)
        .arg("--uninit-reads")
        .arg("zero-init")
        .assert()
        .success()
        .stdout("0.000000\n");
}

#[test]
fn test_missing_file_reports_error() {
    let output = ssc().arg("check").arg("/nonexistent/none.ssc").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to read source file"));
}
