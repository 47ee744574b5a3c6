//! Vocab command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Vocab command arguments.
#[derive(Parser, Debug)]
pub struct VocabCommand {
    /// Text file to count words in
    #[arg(long, value_name = "FILE")]
    pub text: PathBuf,

    /// Output vocabulary file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

use anyhow::{Context, Result};
use log::info;
use subword_tokenizer::{Tokenizer, VocabularySaver};

pub fn run(cmd: VocabCommand) -> Result<()> {
    let tokenizer = Tokenizer::builder().build()?;

    let reader = super::open(&cmd.text)?;
    let vocab = tokenizer
        .vocabulary_from_reader(reader)
        .with_context(|| format!("unable to read {}", cmd.text.display()))?;
    info!(
        "Counted {} distinct words ({} occurrences) in {}",
        vocab.len(),
        vocab.total_occurrences(),
        cmd.text.display()
    );

    VocabularySaver::new(&vocab).save(&cmd.output)?;
    Ok(())
}
