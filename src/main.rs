use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use stackasm::bytecode::disasm::{disassemble, print_listing};
use stackasm::repl::run_repl;
use stackasm::runtime::{ConsoleSink, VirtualMachine, VmConfig};

#[derive(Parser, Debug)]
#[command(name = "stackasm")]
#[command(about = "Run line-oriented assembly on a tiny stack machine", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a program
    Run {
        /// Path to the program
        file: PathBuf,

        /// Stop with an error after this many instructions
        #[arg(long = "max-steps")]
        max_steps: Option<usize>,

        /// Print the final machine state as JSON
        #[arg(long)]
        dump_state: bool,
    },

    /// Parse a program and print its listing without running it
    Check {
        /// Path to the program
        file: PathBuf,
    },

    /// Read statements from stdin and execute them one at a time
    Repl,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };
    process::exit(code);
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Run {
            file,
            max_steps,
            dump_state,
        } => {
            let Some(lines) = read_program(&file)? else {
                return Ok(1);
            };

            let mut vm = VirtualMachine::with_config(VmConfig { max_steps });
            vm.run(&lines, &mut ConsoleSink)
                .with_context(|| format!("running {}", file.display()))?;

            if dump_state {
                let snapshot = vm.state().snapshot();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Ok(0)
        }
        Commands::Check { file } => {
            let Some(lines) = read_program(&file)? else {
                return Ok(1);
            };

            let listing = disassemble(&lines);
            print_listing(&listing);
            Ok(if listing.has_failures() { 1 } else { 0 })
        }
        Commands::Repl => {
            let stdin = io::stdin();
            run_repl(stdin.lock(), &mut io::stdout())?;
            Ok(0)
        }
    }
}

/// Reads a program as lines. A missing file is reported and yields `None`.
fn read_program(path: &Path) -> Result<Option<Vec<String>>> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(Some(source.lines().map(str::to_string).collect())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            println!("File not found. Invalid path.");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("failed to read '{}'", path.display())),
    }
}
