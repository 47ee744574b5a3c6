//! On-disk formats for models and vocabularies.
//!
//! Models are stored either as plain text, one `LEFT RIGHT` operation per
//! line in training order, or as JSON:
//!
//! ```json
//! { "version": "0.3.0", "boundary": "_", "operations": [["E", "S"], ["ES", "T"]] }
//! ```
//!
//! Vocabularies are plain text, one `TOKEN FREQUENCY` record per line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use subword_core::{BpeModel, SubwordError, BOUNDARY};

/// Model file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelFormat {
    /// One operation per line
    #[default]
    Text,
    /// Single JSON document
    Json,
}

impl ModelFormat {
    /// Guess the format from a file extension, defaulting to text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::Json,
            _ => ModelFormat::Text,
        }
    }
}

impl FromStr for ModelFormat {
    type Err = SubwordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ModelFormat::Text),
            "json" => Ok(ModelFormat::Json),
            other => Err(SubwordError::Configuration(format!(
                "Unknown model format '{}', expected 'text' or 'json'",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::Text => f.write_str("text"),
            ModelFormat::Json => f.write_str("json"),
        }
    }
}

/// JSON model document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Version of the library that wrote the file
    pub version: String,
    /// Word boundary marker the operations were learned with
    pub boundary: String,
    /// Operations in training order
    pub operations: Vec<(String, String)>,
}

impl SerializedModel {
    /// Capture a model for serialization.
    pub fn from_model(model: &BpeModel) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            boundary: BOUNDARY.to_string(),
            operations: model
                .iter()
                .map(|op| (op.left.to_string(), op.right.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subword_core::Operation;

    #[test]
    fn test_json_layout() {
        let (model, _) =
            BpeModel::from_operations(vec![Operation::new("E", "S"), Operation::new("ES", "T")]);
        let json = serde_json::to_value(SerializedModel::from_model(&model)).unwrap();

        assert_eq!(json["boundary"], "_");
        assert_eq!(json["operations"], serde_json::json!([["E", "S"], ["ES", "T"]]));
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ModelFormat::from_path(Path::new("m.json")), ModelFormat::Json);
        assert_eq!(ModelFormat::from_path(Path::new("m.JSON")), ModelFormat::Json);
        assert_eq!(ModelFormat::from_path(Path::new("m.bpe")), ModelFormat::Text);
        assert_eq!(ModelFormat::from_path(Path::new("model")), ModelFormat::Text);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<ModelFormat>().unwrap(), ModelFormat::Json);
        assert_eq!("Text".parse::<ModelFormat>().unwrap(), ModelFormat::Text);
        assert!("yaml".parse::<ModelFormat>().is_err());
        assert_eq!(ModelFormat::Json.to_string(), "json");
    }
}
