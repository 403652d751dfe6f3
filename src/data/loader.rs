// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Loads labelled tweets from a CSV file with a header row.
//
// Only two columns matter: the text column and the label
// column. Their names are configurable per file because the
// two source datasets don't agree (`sentiment` vs `Emotion`).
//
// Validation happens here, before anything else runs:
//   - both columns must exist in the header  → MissingColumn
//   - every label must normalise through the LabelScheme
//                                            → InvalidLabel
//   - the file must contain at least one row → EmptyDataset
//
// A missing file or undecodable bytes are fatal as well; the
// csv crate reports invalid UTF-8 with the offending position.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::{
    error::PipelineError,
    example::{Example, LabelScheme},
    traits::ExampleSource,
};

/// Reads Examples from one CSV file.
pub struct CsvExampleSource {
    path:         PathBuf,
    text_column:  String,
    label_column: String,
    scheme:       LabelScheme,
}

impl CsvExampleSource {
    pub fn new(
        path:         impl Into<PathBuf>,
        text_column:  impl Into<String>,
        label_column: impl Into<String>,
        scheme:       LabelScheme,
    ) -> Self {
        Self {
            path:         path.into(),
            text_column:  text_column.into(),
            label_column: label_column.into(),
            scheme,
        }
    }

    fn column_index(&self, headers: &csv::StringRecord, column: &str) -> Result<usize, PipelineError> {
        headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| PipelineError::MissingColumn {
                path:      self.path.display().to_string(),
                column:    column.to_string(),
                available: headers.iter().collect::<Vec<_>>().join(", "),
            })
    }
}

impl ExampleSource for CsvExampleSource {
    fn load_all(&self) -> Result<Vec<Example>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open dataset '{}'", self.path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Cannot read header of '{}'", self.path.display()))?
            .clone();

        // Resolve both columns before touching any row
        let text_idx  = self.column_index(&headers, &self.text_column)?;
        let label_idx = self.column_index(&headers, &self.label_column)?;

        let mut examples = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let row = i + 1;
            let record = record.with_context(|| {
                format!("Cannot decode row {} of '{}'", row, self.path.display())
            })?;

            let text = record.get(text_idx).unwrap_or_default();
            let raw_label = record.get(label_idx).unwrap_or_default();

            let label = self.scheme.parse(raw_label).ok_or_else(|| PipelineError::InvalidLabel {
                path:        self.path.display().to_string(),
                row,
                value:       raw_label.to_string(),
                num_classes: self.scheme.num_classes(),
                names:       self.scheme.names().join(", "),
            })?;

            examples.push(Example::new(text, label));
        }

        if examples.is_empty() {
            return Err(PipelineError::EmptyDataset(self.path.display().to_string()).into());
        }

        tracing::info!(
            "Loaded {} examples from '{}' (text='{}', label='{}')",
            examples.len(),
            self.path.display(),
            self.text_column,
            self.label_column,
        );
        Ok(examples)
    }
}

/// Count of examples per class number, index 0 = class 1.
pub fn label_histogram(examples: &[Example], num_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; num_classes];
    for e in examples {
        if let Some(c) = e.label.checked_sub(1).and_then(|i| counts.get_mut(i)) {
            *c += 1;
        }
    }
    counts
}
