//! Writing models and vocabularies to disk.

use super::format::{ModelFormat, SerializedModel};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use subword_core::{BpeModel, Result, SubwordError, Vocabulary};

/// Model saver.
pub struct ModelSaver<'a> {
    /// Model reference
    model: &'a BpeModel,
    /// Output format
    format: ModelFormat,
}

impl<'a> ModelSaver<'a> {
    /// Create a new model saver.
    pub fn new(model: &'a BpeModel, format: ModelFormat) -> Self {
        Self { model, format }
    }

    /// Save the model to a file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        create_parent(path)?;
        let file = File::create(path).map_err(|e| SubwordError::io(path, e))?;
        let mut writer = BufWriter::new(file);

        self.write(&mut writer).map_err(|e| match e {
            SubwordError::Io { err, .. } => SubwordError::io(path, err),
            other => other,
        })?;
        writer.flush().map_err(|e| SubwordError::io(path, e))?;

        info!(
            "Saved {} operations to {} ({})",
            self.model.len(),
            path.display(),
            self.format
        );
        Ok(())
    }

    /// Write the model in the saver's format.
    pub fn write(&self, writer: &mut impl Write) -> Result<()> {
        match self.format {
            ModelFormat::Text => {
                for operation in self.model {
                    writeln!(writer, "{}", operation).map_err(|e| SubwordError::io("<model>", e))?;
                }
            }
            ModelFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, &SerializedModel::from_model(self.model))?;
                writeln!(writer).map_err(|e| SubwordError::io("<model>", e))?;
            }
        }
        Ok(())
    }
}

/// Vocabulary saver.
pub struct VocabularySaver<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> VocabularySaver<'a> {
    /// Create a new vocabulary saver.
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Save the vocabulary to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        create_parent(path)?;
        let file = File::create(path).map_err(|e| SubwordError::io(path, e))?;
        let mut writer = BufWriter::new(file);

        self.write(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| SubwordError::io(path, e))?;

        info!("Saved {} words to {}", self.vocab.len(), path.display());
        Ok(())
    }

    /// Write `TOKEN FREQUENCY` lines, most frequent first, ties by token.
    pub fn write(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for (token, frequency) in self.vocab.sorted() {
            writeln!(writer, "{} {}", token, frequency)?;
        }
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| SubwordError::io(parent, e))
        }
        _ => Ok(()),
    }
}
