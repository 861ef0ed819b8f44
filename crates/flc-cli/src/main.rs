use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "flc")]
#[command(about = "FLC to LLVM IR compiler")]
#[command(version = COMPILER_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Compile {
        #[arg(help = "Input FLC source file")]
        input: PathBuf,

        #[arg(short, long, help = "Output LLVM IR file", default_value = "output.ll")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { input, output } => {
            let source = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let compilation = flc::compile(&source).context("Compilation failed")?;
            for diagnostic in &compilation.diagnostics {
                tracing::warn!("{diagnostic}");
            }

            fs::write(&output, compilation.module.to_string())
                .with_context(|| format!("Failed to write output to {}", output.display()))?;
            println!("Compiled {} -> {}", input.display(), output.display());
        }
    }

    Ok(())
}
