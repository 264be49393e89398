//! Example: Translate a Brainfuck file and print or run the IR
//!
//! Usage: cargo run --example compile_file -- <program.bf> [--json] [--run]

use anyhow::{Context, Result};
use bflower::compiler::{CompileOptions, Compiler, Executor};
use bflower::lexer::line_col;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "compile_file")]
#[command(about = "Translate a Brainfuck program to CFG IR")]
struct Cli {
    /// Path to the source program
    program: PathBuf,

    /// Optional JSON file with compile options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Print the module as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Execute the IR with stdin as input and print its output
    #[arg(long)]
    run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bflower=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let options = match &cli.options {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading options from {}", path.display()))?;
            CompileOptions::from_json(&json)?
        }
        None => CompileOptions::default(),
    };

    let source = std::fs::read(&cli.program)
        .with_context(|| format!("reading {}", cli.program.display()))?;

    let compiler = Compiler::new(options.clone());
    let result = match compiler.compile(&source) {
        Ok(result) => result,
        Err(err) => {
            if let Some(offset) = err.offset() {
                let (line, col) = line_col(&source, offset);
                anyhow::bail!("{}:{}:{}: {}", cli.program.display(), line, col, err);
            }
            return Err(err.into());
        }
    };

    tracing::info!(
        blocks = result.stats.block_count,
        instructions = result.stats.instruction_count,
        "translated {}",
        cli.program.display()
    );

    if cli.run {
        let mut input = Vec::new();
        std::io::stdin().read_to_end(&mut input)?;
        let outcome = Executor::new(options.symbols).run(&result.module, &input)?;
        std::io::Write::write_all(&mut std::io::stdout(), &outcome.output)?;
    } else if cli.json {
        println!("{}", result.module.to_json()?);
    } else {
        print!("{}", result.module);
    }

    Ok(())
}
