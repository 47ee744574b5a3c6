//! Reading models and vocabularies from disk.

use super::format::{ModelFormat, SerializedModel};
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use subword_core::{BpeModel, Operation, Result, SubwordError, Vocabulary, BOUNDARY};

/// Model loader.
pub struct ModelLoader;

impl ModelLoader {
    /// Load a model file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<BpeModel> {
        Self::load_as(path, ModelFormat::from_path(path))
    }

    /// Load a model file in the given format.
    pub fn load_as(path: &Path, format: ModelFormat) -> Result<BpeModel> {
        let file = File::open(path).map_err(|e| SubwordError::io(path, e))?;
        let reader = BufReader::new(file);

        let model = match format {
            ModelFormat::Text => Self::read_text(reader),
            ModelFormat::Json => Self::read_json(reader),
        }
        .map_err(|e| match e {
            SubwordError::Io { err, .. } => SubwordError::io(path, err),
            other => other,
        })?;

        info!(
            "Loaded {} operations from {} ({})",
            model.len(),
            path.display(),
            format
        );
        Ok(model)
    }

    /// Parse the text format: one `LEFT RIGHT` operation per line.
    pub fn read_text(reader: impl BufRead) -> Result<BpeModel> {
        let mut model = BpeModel::new();

        for (index, line) in reader.lines().enumerate() {
            let line_num = index + 1;
            let line = line.map_err(|e| SubwordError::io("<model>", e))?;

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(SubwordError::corrupt_model(
                    line_num,
                    format!("expected 2 fields, found {}: '{}'", fields.len(), line),
                ));
            }

            if model
                .add_operation(Operation::new(fields[0], fields[1]))
                .is_none()
            {
                return Err(SubwordError::corrupt_model(
                    line_num,
                    format!("duplicate operation '{} {}'", fields[0], fields[1]),
                ));
            }
        }

        Ok(model)
    }

    /// Parse the JSON format.
    pub fn read_json(reader: impl Read) -> Result<BpeModel> {
        let serialized: SerializedModel = serde_json::from_reader(reader)?;
        Self::deserialize(serialized)
    }

    /// Validate a JSON document and build the model from it.
    fn deserialize(data: SerializedModel) -> Result<BpeModel> {
        if data.boundary != BOUNDARY {
            return Err(SubwordError::Configuration(format!(
                "Model uses boundary marker '{}', expected '{}'",
                data.boundary, BOUNDARY
            )));
        }

        let mut model = BpeModel::with_capacity(data.operations.len());
        for (index, (left, right)) in data.operations.into_iter().enumerate() {
            let line_num = index + 1;
            if left.is_empty()
                || right.is_empty()
                || left.contains(char::is_whitespace)
                || right.contains(char::is_whitespace)
            {
                return Err(SubwordError::corrupt_model(
                    line_num,
                    format!("invalid operation '{}' '{}'", left, right),
                ));
            }
            if model.add_operation(Operation::new(left.as_str(), right.as_str())).is_none() {
                return Err(SubwordError::corrupt_model(
                    line_num,
                    format!("duplicate operation '{} {}'", left, right),
                ));
            }
        }

        Ok(model)
    }
}

/// Vocabulary loader.
pub struct VocabularyLoader;

impl VocabularyLoader {
    /// Load a `TOKEN FREQUENCY` vocabulary file.
    pub fn load(path: &Path) -> Result<Vocabulary> {
        let file = File::open(path).map_err(|e| SubwordError::io(path, e))?;
        let vocab = Self::read(BufReader::new(file)).map_err(|e| match e {
            SubwordError::Io { err, .. } => SubwordError::io(path, err),
            other => other,
        })?;

        info!(
            "Loaded {} words ({} occurrences) from {}",
            vocab.len(),
            vocab.total_occurrences(),
            path.display()
        );
        Ok(vocab)
    }

    /// Parse vocabulary records. Repeated tokens accumulate.
    pub fn read(reader: impl BufRead) -> Result<Vocabulary> {
        let mut vocab = Vocabulary::new();

        for (index, line) in reader.lines().enumerate() {
            let line_num = index + 1;
            let line = line.map_err(|e| SubwordError::io("<vocabulary>", e))?;

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(SubwordError::corrupt_vocabulary(
                    line_num,
                    format!("expected 2 fields, found {}: '{}'", fields.len(), line),
                ));
            }

            let frequency = match fields[1].parse::<u64>() {
                Ok(frequency) if frequency > 0 => frequency,
                _ => {
                    return Err(SubwordError::corrupt_vocabulary(
                        line_num,
                        format!("frequency '{}' is not a positive integer", fields[1]),
                    ))
                }
            };

            vocab
                .add_word(fields[0], frequency)
                .map_err(|e| SubwordError::corrupt_vocabulary(line_num, e.to_string()))?;
        }

        Ok(vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_text() {
        let model = ModelLoader::read_text(Cursor::new("E S\nES T\n EST   _ \n")).unwrap();
        assert_eq!(model.len(), 3);
        assert_eq!(model.rank("EST", "_"), Some(2));
    }

    #[test]
    fn test_read_text_empty() {
        let model = ModelLoader::read_text(Cursor::new("")).unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_read_text_wrong_field_count() {
        let err = ModelLoader::read_text(Cursor::new("E S\nES T X\n")).unwrap_err();
        assert!(matches!(err, SubwordError::CorruptModel { line: 2, .. }));

        let err = ModelLoader::read_text(Cursor::new("E S\n\nES T\n")).unwrap_err();
        assert!(matches!(err, SubwordError::CorruptModel { line: 2, .. }));

        let err = ModelLoader::read_text(Cursor::new("E\n")).unwrap_err();
        assert!(matches!(err, SubwordError::CorruptModel { line: 1, .. }));
    }

    #[test]
    fn test_read_text_duplicate() {
        let err = ModelLoader::read_text(Cursor::new("E S\nES T\nE S\n")).unwrap_err();
        assert!(matches!(err, SubwordError::CorruptModel { line: 3, .. }));
    }

    #[test]
    fn test_read_text_keeps_case() {
        let model = ModelLoader::read_text(Cursor::new("e s\n")).unwrap();
        assert_eq!(model.rank("e", "s"), Some(0));
        assert_eq!(model.rank("E", "S"), None);
    }

    #[test]
    fn test_read_json() {
        let json = r#"{"version": "0.1.0", "boundary": "_", "operations": [["E", "S"], ["ES", "T"]]}"#;
        let model = ModelLoader::read_json(Cursor::new(json)).unwrap();
        assert_eq!(model.operations(), &[Operation::new("E", "S"), Operation::new("ES", "T")]);
    }

    #[test]
    fn test_read_json_invalid() {
        let duplicate = r#"{"version": "0", "boundary": "_", "operations": [["E", "S"], ["E", "S"]]}"#;
        let err = ModelLoader::read_json(Cursor::new(duplicate)).unwrap_err();
        assert!(matches!(err, SubwordError::CorruptModel { line: 2, .. }));

        let boundary = r#"{"version": "0", "boundary": "</w>", "operations": []}"#;
        let err = ModelLoader::read_json(Cursor::new(boundary)).unwrap_err();
        assert!(matches!(err, SubwordError::Configuration(_)));

        let err = ModelLoader::read_json(Cursor::new("[1, 2")).unwrap_err();
        assert!(matches!(err, SubwordError::Json(_)));
    }

    #[test]
    fn test_read_vocabulary() {
        let vocab = VocabularyLoader::read(Cursor::new("NEWEST 6\nLOW 5\nLOW 2\n")).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.frequency("LOW"), 7);
        assert_eq!(vocab.frequency("NEWEST"), 6);
    }

    #[test]
    fn test_read_vocabulary_invalid() {
        for (text, line) in [
            ("LOW 5\nLOWER\n", 2),
            ("LOW five\n", 1),
            ("LOW 0\n", 1),
            ("LOW -3\n", 1),
            ("LOW 5 5\n", 1),
            ("LOW 5\n\n", 2),
            ("LOW 18446744073709551615\nLOW 1\n", 2),
        ] {
            let err = VocabularyLoader::read(Cursor::new(text)).unwrap_err();
            assert!(
                matches!(err, SubwordError::CorruptVocabulary { line: l, .. } if l == line),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bpe");
        let err = ModelLoader::load(&path).unwrap_err();
        assert!(matches!(err, SubwordError::Io { ref path, .. } if path.ends_with("missing.bpe")));
    }
}
