//! SSC compiler CLI
//!
//! Main entry point for the SSC toolchain

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ssc_codegen::{CompileOptions, UninitPolicy};
use ssc_driver::Config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod build;
mod check;
mod diagnostics;
mod emit;
mod logger;
mod run;

#[derive(Parser)]
#[command(name = "ssc")]
#[command(about = "Compile SSC scripts to LLVM IR", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// How to treat reads of variables that were never assigned
    #[arg(long, global = true, value_enum)]
    uninit_reads: Option<UninitReads>,

    /// Configuration file (defaults to ssc.toml beside the script)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a script to a `.ll` file
    Build {
        /// Source file
        file: PathBuf,

        /// Output path (defaults to the source path with `.ll`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the IR of a script to stdout
    Emit {
        /// Source file
        file: PathBuf,
    },

    /// Compile a script and run it with the interpreter
    Run {
        /// Source file
        file: PathBuf,
    },

    /// Check a script for errors without writing anything
    Check {
        /// Source file
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UninitReads {
    /// Load the unspecified slot contents
    Preserve,
    /// Read as 0.0
    ZeroInit,
    /// Reject the program
    Error,
}

impl From<UninitReads> for UninitPolicy {
    fn from(value: UninitReads) -> Self {
        match value {
            UninitReads::Preserve => Self::Preserve,
            UninitReads::ZeroInit => Self::ZeroInit,
            UninitReads::Error => Self::Error,
        }
    }
}

impl Cli {
    fn options_for(&self, file: &Path) -> Result<CompileOptions> {
        let mut options = Config::for_script(file, self.config.as_deref())?.compile;
        if let Some(policy) = self.uninit_reads {
            options.uninit_reads = policy.into();
        }
        Ok(options)
    }
}

fn execute(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Build { file, output } => {
            build::build(file, output.as_deref(), &cli.options_for(file)?)?;
        }
        Commands::Emit { file } => {
            emit::emit(file, &cli.options_for(file)?)?;
        }
        Commands::Run { file } => {
            return run::run(file, &cli.options_for(file)?);
        }
        Commands::Check { file } => {
            check::check(file, &cli.options_for(file)?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match execute(&cli) {
        Ok(code) => code,
        Err(err) => {
            diagnostics::report(&err);
            ExitCode::FAILURE
        }
    }
}
