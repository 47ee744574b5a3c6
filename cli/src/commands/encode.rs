//! Encode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Encode command arguments.
#[derive(Parser, Debug)]
pub struct EncodeCommand {
    /// Trained model file
    #[arg(long, value_name = "FILE")]
    pub bpe_model: PathBuf,

    /// Text file to encode
    #[arg(long, value_name = "FILE")]
    pub text: PathBuf,

    /// Output subword file, one line per input line
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use subword_tokenizer::Tokenizer;

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let tokenizer = Tokenizer::load(&cmd.bpe_model)?;

    let reader = super::open(&cmd.text)?;
    let mut writer = super::create(&cmd.output)?;
    let lines = tokenizer
        .encode_lines(reader, &mut writer)
        .with_context(|| format!("unable to encode {}", cmd.text.display()))?;
    writer
        .flush()
        .with_context(|| format!("unable to write {}", cmd.output.display()))?;

    info!("Encoded {} lines to {}", lines, cmd.output.display());
    Ok(())
}
