// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, not
// against the CSV reader, the JSON files, or the Burn model.
//
//   - CsvExampleSource implements ExampleSource
//   - Vocabulary       implements Persistable
//   - Inferencer       implements SentimentClassifier
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::{path::Path, time::Duration};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::example::Example;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can produce labelled examples.
pub trait ExampleSource {
    /// Load every example, validating labels on the way.
    fn load_all(&self) -> Result<Vec<Example>>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
pub trait Persistable: Sized {
    fn save(&self, path: &Path) -> Result<()>;

    fn load(path: &Path) -> Result<Self>;
}

// ─── SentimentClassifier ──────────────────────────────────────────────────────
/// The outcome of classifying one text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class number (1-based)
    pub label: usize,

    /// Human-readable name of `label`
    pub class_name: String,

    /// Softmax output, one entry per class in class-number order
    pub probabilities: Vec<f32>,

    /// Tokens that were not in the training vocabulary (encoded as padding)
    pub unknown_tokens: usize,

    /// Wall-clock time of clean + encode + forward pass
    pub elapsed: Duration,
}

impl Prediction {
    pub fn confidence(&self) -> f32 {
        self.probabilities
            .get(self.label.saturating_sub(1))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Any component that can classify a single raw text.
pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Prediction>;
}
