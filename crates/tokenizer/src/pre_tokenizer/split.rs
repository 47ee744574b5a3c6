//! Splitting normalized text into word tokens.

use regex::Regex;
use subword_core::{Result, SubwordError};

/// Splitting patterns.
#[derive(Debug, Clone)]
pub enum SplitPattern {
    /// Split on runs of whitespace
    Whitespace,
    /// Split on matches of a regex, and on whitespace
    Custom(Regex),
}

/// Text splitter.
///
/// Tokens never contain whitespace and are never empty.
#[derive(Debug, Clone)]
pub struct Splitter {
    /// Pattern to split on
    pattern: SplitPattern,
}

impl Splitter {
    /// Create a new splitter.
    pub fn new(pattern: SplitPattern) -> Self {
        Self { pattern }
    }

    /// Create a whitespace splitter.
    pub fn whitespace() -> Self {
        Self::new(SplitPattern::Whitespace)
    }

    /// Create a splitter on a custom separator regex.
    pub fn regex(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            SubwordError::Configuration(format!("Invalid split pattern '{}': {}", pattern, e))
        })?;
        Ok(Self::new(SplitPattern::Custom(regex)))
    }

    /// Split text into tokens.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        match &self.pattern {
            SplitPattern::Whitespace => text.split_whitespace().collect(),
            SplitPattern::Custom(regex) => regex
                .split(text)
                .flat_map(str::split_whitespace)
                .collect(),
        }
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::whitespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_split() {
        let splitter = Splitter::whitespace();
        let result = splitter.split(" hello world \n test\t");
        assert_eq!(result, vec!["hello", "world", "test"]);
    }

    #[test]
    fn test_custom_split() {
        let splitter = Splitter::regex(r"[-,]").unwrap();
        let result = splitter.split("well-known, twice told");
        assert_eq!(result, vec!["well", "known", "twice", "told"]);
    }

    #[test]
    fn test_distinct_patterns() {
        let dashes = Splitter::regex("-").unwrap();
        let commas = Splitter::regex(",").unwrap();
        assert_eq!(dashes.split("A-B,C"), vec!["A", "B,C"]);
        assert_eq!(commas.split("A-B,C"), vec!["A-B", "C"]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Splitter::regex("(").is_err());
    }

    #[test]
    fn test_empty_string() {
        let splitter = Splitter::whitespace();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   ").is_empty());
    }
}
