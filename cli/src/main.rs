//! Subword CLI - command-line interface for BPE subword models.
//!
//! This is the main entry point for the `subword` command-line tool.

mod commands;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use commands::{DecodeCommand, EncodeCommand, TrainCommand, VocabCommand};
use env_logger::Env;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "subword")]
#[command(about = "Learn and apply byte-pair-encoding subword models", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count word frequencies of a text file
    Vocab(VocabCommand),
    /// Learn merge operations from a vocabulary file
    Train(TrainCommand),
    /// Encode a text file into subwords
    Encode(EncodeCommand),
    /// Decode a subword file back into text
    Decode(DecodeCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Vocab(cmd) => commands::vocab::run(cmd)?,
        Commands::Train(cmd) => commands::train::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
    }

    Ok(())
}

/// Explicit level from `-v`/`-q`, or `None` to defer to `RUST_LOG`.
fn log_level(verbose: u8, quiet: u8) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (0, 0) => None,
        (0, 1) => Some(LevelFilter::Debug),
        (0, _) => Some(LevelFilter::Trace),
        (1, _) => Some(LevelFilter::Warn),
        _ => Some(LevelFilter::Error),
    }
}

fn init_logging(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if let Some(level) = log_level(verbose, quiet) {
        builder.filter_level(level);
    }
    builder.try_init().context("unable to initialise logging")?;
    Ok(())
}
