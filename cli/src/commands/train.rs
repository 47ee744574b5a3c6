//! Train command implementation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use subword_training::{DEFAULT_MAX_SUBWORDS, DEFAULT_SEARCH_SET_SIZE};

/// Model file format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// One `LEFT RIGHT` operation per line
    Text,
    /// JSON document
    Json,
}

/// Train command arguments.
#[derive(Parser, Debug)]
pub struct TrainCommand {
    /// Vocabulary file of `TOKEN FREQUENCY` lines
    #[arg(long, value_name = "FILE")]
    pub vocabulary: PathBuf,

    /// Output model file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Maximum number of distinct subwords, alphabet included
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_SUBWORDS)]
    pub max_subwords: usize,

    /// Exact number of merge operations instead of a subword limit
    #[arg(long, value_name = "N", conflicts_with = "max_subwords")]
    pub operations: Option<usize>,

    /// Minimum frequency for merges
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    pub min_frequency: u64,

    /// Pairs the search set is steered toward on each rebuild
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SEARCH_SET_SIZE)]
    pub search_set_size: usize,

    /// Model file format (defaults to the output file extension)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

use anyhow::Result;
use log::info;
use subword_tokenizer::{ModelFormat, ModelSaver, VocabularyLoader};
use subword_training::{BpeTrainer, TrainingConfig};

pub fn run(cmd: TrainCommand) -> Result<()> {
    let mut config = TrainingConfig::builder()
        .max_subwords(cmd.max_subwords)
        .min_frequency(cmd.min_frequency)
        .search_set_size(cmd.search_set_size);
    if let Some(operations) = cmd.operations {
        config = config.operations(operations);
    }
    let config = config.build()?;

    let vocab = VocabularyLoader::load(&cmd.vocabulary)?;
    let output = BpeTrainer::new(config).train(&vocab)?;

    let format = match cmd.format {
        Some(FormatArg::Text) => ModelFormat::Text,
        Some(FormatArg::Json) => ModelFormat::Json,
        None => ModelFormat::from_path(&cmd.output),
    };
    ModelSaver::new(&output.model, format).save(&cmd.output)?;

    info!(
        "Stopped after {} operations: {:?} (final threshold {})",
        output.stats.operations, output.stats.stop_reason, output.stats.final_threshold
    );
    Ok(())
}
