//! Text normalization before splitting into words.
//!
//! Normalization runs in three stages: a Unicode normalization form, case
//! folding to upper case, and replacement of every character matched by a
//! strip pattern with a space.

use regex::Regex;
use subword_core::{Result, SubwordError};
use unicode_normalization::UnicodeNormalization;

/// Characters outside `A`-`Z` and the apostrophe.
pub const DEFAULT_STRIP_PATTERN: &str = r"[^A-Z']";

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    /// Canonical composition
    #[default]
    NFC,
    /// Canonical decomposition
    NFD,
    /// Compatibility composition
    NFKC,
    /// Compatibility decomposition
    NFKD,
    /// No normalization
    None,
}

/// Text normalizer.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Normalization form to apply
    form: NormalizationForm,
    /// Fold to upper case
    uppercase: bool,
    /// Characters to replace with a space
    strip: Option<Regex>,
}

impl Normalizer {
    /// Create a normalizer that only applies a normalization form.
    pub fn new(form: NormalizationForm) -> Self {
        Self {
            form,
            uppercase: false,
            strip: None,
        }
    }

    /// Create an NFC-only normalizer.
    pub fn nfc() -> Self {
        Self::new(NormalizationForm::NFC)
    }

    /// NFC, upper case, and everything but letters and apostrophes blanked.
    pub fn words_only() -> Self {
        Self {
            form: NormalizationForm::NFC,
            uppercase: true,
            strip: Regex::new(DEFAULT_STRIP_PATTERN).ok(),
        }
    }

    /// Enable or disable upper-case folding.
    pub fn with_uppercase(mut self, uppercase: bool) -> Self {
        self.uppercase = uppercase;
        self
    }

    /// Replace every match of `pattern` with a space.
    ///
    /// Fails with a configuration error if the pattern does not compile.
    pub fn with_strip_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            SubwordError::Configuration(format!("Invalid strip pattern '{}': {}", pattern, e))
        })?;
        self.strip = Some(regex);
        Ok(self)
    }

    /// Stop replacing characters.
    pub fn without_strip(mut self) -> Self {
        self.strip = None;
        self
    }

    /// The normalization form.
    pub fn form(&self) -> NormalizationForm {
        self.form
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        let mut text: String = match self.form {
            NormalizationForm::NFC => text.nfc().collect(),
            NormalizationForm::NFD => text.nfd().collect(),
            NormalizationForm::NFKC => text.nfkc().collect(),
            NormalizationForm::NFKD => text.nfkd().collect(),
            NormalizationForm::None => text.to_string(),
        };
        if self.uppercase {
            text = text.to_uppercase();
        }
        match &self.strip {
            Some(strip) => strip.replace_all(&text, " ").into_owned(),
            None => text,
        }
    }

    /// Check if normalization changes anything.
    pub fn is_enabled(&self) -> bool {
        self.form != NormalizationForm::None || self.uppercase || self.strip.is_some()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::words_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.normalize("Don't panic, it's 42-ish!"),
            "DON'T PANIC  IT'S    ISH "
        );
    }

    #[test]
    fn test_nfc_normalization() {
        let normalizer = Normalizer::nfc();
        // e + combining acute accent
        let result = normalizer.normalize("e\u{0301}");
        assert_eq!(result, "\u{00e9}");
    }

    #[test]
    fn test_nfd_normalization() {
        let normalizer = Normalizer::new(NormalizationForm::NFD);
        let result = normalizer.normalize("\u{00e9}");
        assert_eq!(result, "e\u{0301}");
    }

    #[test]
    fn test_accented_letters_are_stripped_by_default() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("café"), "CAF ");
    }

    #[test]
    fn test_custom_strip_pattern() {
        let normalizer = Normalizer::nfc()
            .with_uppercase(true)
            .with_strip_pattern(r"[^\p{Lu}']")
            .unwrap();
        assert_eq!(normalizer.normalize("café au lait"), "CAFÉ AU LAIT");
    }

    #[test]
    fn test_invalid_strip_pattern() {
        let err = Normalizer::nfc().with_strip_pattern("[").unwrap_err();
        assert!(matches!(err, SubwordError::Configuration(_)));
    }

    #[test]
    fn test_is_enabled() {
        assert!(Normalizer::nfc().is_enabled());
        assert!(!Normalizer::new(NormalizationForm::None).is_enabled());
        assert!(Normalizer::new(NormalizationForm::None)
            .with_uppercase(true)
            .is_enabled());
    }
}
