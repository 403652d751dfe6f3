// ============================================================
// Layer 3 — Example and LabelScheme
// ============================================================
// An Example is one labelled tweet: the raw text exactly as
// it appeared in the dataset and a 1-based class number.
//
// The two source datasets disagree on how labels are written
// (an integer `sentiment` column vs. a string `Emotion`
// column). LabelScheme is the single canonical answer: labels
// are integers 1..=N, and a cell may also spell out the class
// name, which is normalised to its number at load time.
//
// Class number k is trained against output unit k - 1, so the
// classifier has exactly N output units.

use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;

/// One labelled tweet. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Raw tweet text, before hashtag/mention stripping
    pub text: String,

    /// Class number, 1..=num_classes
    pub label: usize,
}

impl Example {
    pub fn new(text: impl Into<String>, label: usize) -> Self {
        Self { text: text.into(), label }
    }
}

/// Ordered class names. Position i holds the name of class i + 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelScheme {
    names: Vec<String>,
}

impl LabelScheme {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn num_classes(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of a 1-based class number, or the number itself if unnamed.
    pub fn name_of(&self, label: usize) -> String {
        label
            .checked_sub(1)
            .and_then(|i| self.names.get(i))
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }

    /// Normalise a raw label cell to a class number.
    ///
    /// Accepts an integer in 1..=N or a class name (case-insensitive,
    /// surrounding whitespace ignored). Returns None for anything else.
    pub fn parse(&self, raw: &str) -> Option<usize> {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<usize>() {
            return (1..=self.num_classes()).contains(&n).then_some(n);
        }
        let raw = raw.to_lowercase();
        self.names
            .iter()
            .position(|name| name.to_lowercase() == raw)
            .map(|i| i + 1)
    }

    /// Class number → zero-based output unit.
    pub fn to_index(&self, label: usize) -> Result<usize, PipelineError> {
        if (1..=self.num_classes()).contains(&label) {
            Ok(label - 1)
        } else {
            Err(PipelineError::LabelOutOfRange {
                label,
                num_classes: self.num_classes(),
            })
        }
    }

    /// Zero-based output unit → class number.
    pub fn from_index(&self, index: usize) -> usize {
        index + 1
    }
}

impl Default for LabelScheme {
    fn default() -> Self {
        Self::new(
            ["very negative", "negative", "neutral", "positive", "very positive"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_numbers_and_names() {
        let scheme = LabelScheme::default();
        assert_eq!(scheme.parse("3"), Some(3));
        assert_eq!(scheme.parse(" 5 "), Some(5));
        assert_eq!(scheme.parse("neutral"), Some(3));
        assert_eq!(scheme.parse(" Neutral "), Some(3));
        assert_eq!(scheme.parse("VERY POSITIVE"), Some(5));
    }

    #[test]
    fn test_parse_folds_case_beyond_ascii() {
        let scheme = LabelScheme::new(vec!["Ärgerlich".into(), "Fröhlich".into()]);
        assert_eq!(scheme.parse("ärgerlich"), Some(1));
        assert_eq!(scheme.parse("FRÖHLICH"), Some(2));
        assert_eq!(scheme.parse("fröhlich "), Some(2));
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_unknown() {
        let scheme = LabelScheme::default();
        assert_eq!(scheme.parse("0"), None);
        assert_eq!(scheme.parse("6"), None);
        assert_eq!(scheme.parse("meh"), None);
        assert_eq!(scheme.parse(""), None);
    }

    #[test]
    fn test_index_mapping() {
        let scheme = LabelScheme::default();
        assert_eq!(scheme.to_index(1).unwrap(), 0);
        assert_eq!(scheme.to_index(5).unwrap(), 4);
        assert_eq!(scheme.from_index(4), 5);
        assert!(matches!(
            scheme.to_index(6),
            Err(PipelineError::LabelOutOfRange { label: 6, num_classes: 5 })
        ));
    }

    #[test]
    fn test_name_of() {
        let scheme = LabelScheme::default();
        assert_eq!(scheme.name_of(1), "very negative");
        assert_eq!(scheme.name_of(9), "9");
    }
}
