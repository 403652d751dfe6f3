// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Failures caused by bad inputs rather than by bugs. These are
// raised as early as possible (at load time) so a renamed CSV
// column or a stray label never surfaces deep inside training.
//
// The application layer wraps them in anyhow::Error with extra
// context; tests downcast back to PipelineError to match on the
// exact variant.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("column '{column}' not found in '{path}' (available: {available})")]
    MissingColumn {
        path:      String,
        column:    String,
        available: String,
    },

    #[error("invalid label '{value}' at row {row} of '{path}': expected 1..={num_classes} or one of [{names}]")]
    InvalidLabel {
        path:        String,
        row:         usize,
        value:       String,
        num_classes: usize,
        names:       String,
    },

    #[error("label {label} is outside 1..={num_classes}")]
    LabelOutOfRange { label: usize, num_classes: usize },

    #[error("dataset '{0}' contains no rows")]
    EmptyDataset(String),

    #[error("embedding matrix has {actual} columns, model expects {expected}")]
    EmbeddingDimMismatch { expected: usize, actual: usize },

    #[error("vocabulary has {actual} embedding rows, checkpoint was trained with {expected}")]
    VocabularyMismatch { expected: usize, actual: usize },
}
