//! CLI commands for the subword tool.

pub mod decode;
pub mod encode;
pub mod train;
pub mod vocab;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use train::TrainCommand;
pub use vocab::VocabCommand;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Open a file for buffered reading.
pub(crate) fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("unable to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Create a file for buffered writing.
pub(crate) fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
