use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use dual_issue::{AsmConfig, Isa, Program};
use dual_sched::{assemble_file, build_report, load_listing, verify};

#[derive(Parser, Debug)]
#[command(author, version, about = "Dual-issue packet scheduler", long_about = None)]
struct Cli {
    /// Output format: text packets or a JSON report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
    /// Re-check packet invariants before writing
    #[arg(long, global = true)]
    verify: bool,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Schedule an existing assembler listing
    Schedule {
        /// Listing produced by `dual-asm`
        #[arg(value_name = "LISTING", default_value = "output.txt")]
        input: PathBuf,
        /// Write packets to this file
        #[arg(long, value_name = "FILE", default_value = "scheduled_instructions.txt")]
        out: PathBuf,
    },
    /// Assemble a source file, write its listing, then schedule that listing
    Build {
        /// Assembly source
        #[arg(value_name = "SOURCE", default_value = "input.txt")]
        input: PathBuf,
        /// Intermediate listing path
        #[arg(long, value_name = "FILE", default_value = "output.txt")]
        listing: PathBuf,
        /// Write packets to this file
        #[arg(long, value_name = "FILE", default_value = "scheduled_instructions.txt")]
        out: PathBuf,
        /// Slot address of the first instruction
        #[arg(long, default_value_t = 0u32)]
        origin: u32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

fn write_packets(program: &Program, format: OutputFormat, check: bool, out: &Path) -> Result<()> {
    let schedule = program.schedule();
    if check {
        verify(program, &schedule)?;
    }
    let body = match format {
        OutputFormat::Text => program.render(&schedule.packets),
        OutputFormat::Json => serde_json::to_string_pretty(&build_report(program, &schedule))?,
    };
    std::fs::write(out, body).with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(packets = schedule.packets.len(), out = %out.display(), "wrote packets");
    println!("Scheduling complete. Scheduled instructions written to '{}'.", out.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let isa = Isa::new();

    match cli.cmd {
        Command::Schedule { input, out } => {
            let program = load_listing(&input, &isa)?;
            write_packets(&program, cli.format, cli.verify, &out)?;
        }
        Command::Build { input, listing, out, origin } => {
            let cfg = AsmConfig { origin, ..AsmConfig::default() };
            let program = assemble_file(&input, &listing, &isa, cfg)?;
            write_packets(&program, cli.format, cli.verify, &out)?;
        }
    }
    Ok(())
}
