//! Integration test utilities for the SSC compiler

use anyhow::{Context, Result};
use ssc_codegen::CompileOptions;
use ssc_interpreter::{Execution, Interpreter};
use ssc_ir::Module;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A script under `test-programs/` with its expected output
#[derive(Debug, Clone)]
pub struct TestProgram {
    /// File stem, e.g. `01-arithmetic`
    pub name: String,
    /// Script source
    pub source: String,
    /// Contents of the sibling `.out` file
    pub expected_stdout: String,
}

/// Directory holding the bundled test programs
#[must_use]
pub fn programs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-programs")
}

/// Load every `.ssc` file in `dir` together with its `.out` file, sorted by name
///
/// # Errors
///
/// Returns an error if a script or its expected output cannot be read
pub fn load_programs(dir: &Path) -> Result<Vec<TestProgram>> {
    let mut programs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "ssc") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let expected_path = path.with_extension("out");
        programs.push(TestProgram {
            name,
            source: fs::read_to_string(&path)?,
            expected_stdout: fs::read_to_string(&expected_path)
                .with_context(|| format!("Missing expected output {}", expected_path.display()))?,
        });
    }
    programs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(programs)
}

/// Compile `source` with default options and return the finished module
///
/// # Errors
///
/// Returns the parse or emission error
pub fn compile_module(source: &str) -> Result<Module> {
    Ok(ssc_parser::compile(source, "test.ssc", CompileOptions::default())?.into_module())
}

/// Compile and execute `source` with default options
///
/// # Errors
///
/// Returns an error if compilation or execution fails
pub fn execute(source: &str) -> Result<Execution> {
    let module = compile_module(source)?;
    Ok(Interpreter::new().run(&module)?)
}

/// Scratch directory for file-based driver tests
pub struct TestFixture {
    dir: TempDir,
}

impl TestFixture {
    /// Creates an empty fixture directory
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created
    pub fn new() -> Result<Self> {
        Ok(Self { dir: TempDir::new()? })
    }

    /// Root of the fixture
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a file relative to the fixture root
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn add_file(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}
