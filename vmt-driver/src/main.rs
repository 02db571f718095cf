//! Hack VM Translator Driver
//!
//! Command-line front end: translate VM programs to Hack assembly, assemble
//! them to binary, or run them on the emulator.

mod config;
mod pipeline;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hvm::constants::{DEFAULT_MAX_STEPS, SP};
use hvm::VM;
use log::info;
use pipeline::BootstrapMode;
use std::fs;
use std::path::{Path, PathBuf};
use vmt_codegen::TranslatorOptions;

#[derive(Parser)]
#[command(name = "vmt")]
#[command(about = "Hack VM Translator")]
#[command(version = "0.1.0")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TranslateArgs {
    /// A .vm file or a directory of .vm files
    input: PathBuf,

    /// Emit the bootstrap prologue
    #[arg(long, value_enum, default_value = "auto")]
    bootstrap: BootstrapMode,

    /// Function called by the bootstrap
    #[arg(long)]
    entry_point: Option<String>,

    /// Omit the source comment before each fragment
    #[arg(long)]
    no_annotate: bool,

    /// JSON file with translator options
    #[arg(long)]
    config: Option<PathBuf>,
}

impl TranslateArgs {
    /// Config file first, then command-line overrides
    fn options(&self) -> Result<TranslatorOptions> {
        let mut options = match &self.config {
            Some(path) => config::load_options(path)?,
            None => TranslatorOptions::default(),
        };
        if let Some(entry) = &self.entry_point {
            options.entry_point = entry.clone();
        }
        if self.no_annotate {
            options.annotate = false;
        }
        config::validate_options(&options)?;
        Ok(options)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Translate VM code to Hack assembly
    Translate {
        #[command(flatten)]
        args: TranslateArgs,

        /// Output assembly file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble Hack assembly to binary text
    Assemble {
        /// Input assembly file
        input: PathBuf,

        /// Output .hack file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate (or load an .asm file) and execute on the emulator
    Run {
        #[command(flatten)]
        args: TranslateArgs,

        /// Instruction budget
        #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
        steps: u64,
    },

    /// Write a config file holding the default options
    InitConfig {
        #[arg(default_value = "vmt.json")]
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Translate { args, output } => translate_command(&args, output.as_deref()),
        Commands::Assemble { input, output } => assemble_command(&input, output.as_deref()),
        Commands::Run { args, steps } => run_command(&args, steps),
        Commands::InitConfig { path } => config::save_options(&TranslatorOptions::default(), &path),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn translate_command(args: &TranslateArgs, output: Option<&Path>) -> Result<()> {
    let options = args.options()?;
    let asm = pipeline::translate(&args.input, &options, args.bootstrap)?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => pipeline::default_output(&args.input)?,
    };
    fs::write(&output, asm).with_context(|| format!("writing {}", output.display()))?;
    println!("Assembly written to: {}", output.display());
    Ok(())
}

fn assemble_command(input: &Path, output: Option<&Path>) -> Result<()> {
    let source = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let program = assemble(&source)?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("hack"),
    };
    fs::write(&output, hack_asm::format_binary(&program))
        .with_context(|| format!("writing {}", output.display()))?;
    println!("{} words written to: {}", program.len(), output.display());
    Ok(())
}

fn run_command(args: &TranslateArgs, steps: u64) -> Result<()> {
    let options = args.options()?;
    let asm = if args.input.extension().is_some_and(|ext| ext == "asm") {
        fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input.display()))?
    } else {
        pipeline::translate(&args.input, &options, args.bootstrap)?
    };

    let program = assemble(&asm)?;
    let mut vm = VM::new();
    vm.load_program(&program.words)?;
    let executed = vm.run(steps)?;
    info!("Halted after {} instructions", executed);

    let stack: Vec<i16> = vm.stack(options.stack_base).iter().map(|&w| w as i16).collect();
    println!("SP = {}", vm.peek(SP));
    println!("stack = {:?}", stack);
    Ok(())
}

/// Assemble, printing every error before failing
fn assemble(source: &str) -> Result<hack_asm::Program> {
    hack_asm::assemble(source).map_err(|errors| {
        for err in &errors {
            eprintln!("error: {}", err);
        }
        anyhow::anyhow!("assembly failed with {} errors", errors.len())
    })
}
