use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dual_issue::{listing, AsmConfig, Assembler, Isa};

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble MIPS-subset source into a word listing")]
struct Opts {
    /// Input assembly file (one instruction, label or comment per line)
    #[arg(short, long, default_value = "input.txt")]
    input: PathBuf,
    /// Output listing, one `<source> --> [ binary: .., hex: .. ]` line per word
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,
    /// Slot address of the first instruction
    #[arg(long, default_value_t = 0u32)]
    origin: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;

    let isa = Isa::new();
    let cfg = AsmConfig { origin: opts.origin, ..AsmConfig::default() };
    let asm = Assembler::new(&isa, cfg).assemble(&text)?;

    fs::write(&opts.output, listing::render(&asm.words))
        .with_context(|| format!("writing {}", opts.output.display()))?;
    println!("Assembled {} words into '{}'.", asm.words.len(), opts.output.display());
    Ok(())
}
