//! Decode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Decode command arguments.
#[derive(Parser, Debug)]
pub struct DecodeCommand {
    /// Subword file to decode
    #[arg(long, value_name = "FILE")]
    pub subwords: PathBuf,

    /// Output text file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Validate subwords against this model
    #[arg(long, value_name = "FILE")]
    pub bpe_model: Option<PathBuf>,
}

use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use subword_core::SubwordDecoder;
use subword_tokenizer::{decode_lines, Tokenizer};

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let reader = super::open(&cmd.subwords)?;
    let mut writer = super::create(&cmd.output)?;

    let lines = match &cmd.bpe_model {
        Some(path) => Tokenizer::load(path)?.decode_lines(reader, &mut writer),
        None => decode_lines(&SubwordDecoder::unchecked(), reader, &mut writer),
    }
    .with_context(|| format!("unable to decode {}", cmd.subwords.display()))?;
    writer
        .flush()
        .with_context(|| format!("unable to write {}", cmd.output.display()))?;

    info!("Decoded {} lines to {}", lines, cmd.output.display());
    Ok(())
}
