// ============================================================
// Layer 4 — Embedding Matrix Builder
// ============================================================
// Builds the frozen lookup table for the model's embedding
// layer from a pretrained word-vector text file:
//
//   token f1 f2 ... fD      (one entry per line)
//
// The matrix has vocabulary.len() + 1 rows and D columns and
// starts all zero. For each file line whose token is in the
// vocabulary, the first D floats are copied into that token's
// row. Row 0 (padding) and rows of tokens the file doesn't
// contain stay zero.
//
// Vector files are large (millions of lines), so they are
// streamed line by line and never held in memory.
//
// Line policies:
//   - fewer than D + 1 fields, an unparsable float among the
//     first D, or invalid UTF-8  → skipped and counted
//   - more than D floats         → truncated to the first D
//   - "<count> <D>" first line    → word2vec header, skipped;
//     the second number must equal D, so with D > 1 no vector
//     line can look like one. With D = 1 "<int> 1" is only a
//     header when the first number is not a vocabulary token
//   - repeated token             → first occurrence wins
//
// Only lines whose token is in the vocabulary have their floats
// parsed; a bad float on an unused line costs nothing.
//
// Reference: Rust Book §12 (I/O), ndarray crate documentation

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, ArrayView1};

use crate::data::vocabulary::Vocabulary;

/// How many malformed lines are logged individually before going quiet
const MALFORMED_LOG_LIMIT: usize = 5;

/// Vocabulary-indexed matrix of word vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    weights: Array2<f32>,
}

impl EmbeddingMatrix {
    pub fn zeros(rows: usize, dim: usize) -> Self {
        Self { weights: Array2::zeros((rows, dim)) }
    }

    pub fn rows(&self) -> usize {
        self.weights.nrows()
    }

    pub fn dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn row(&self, id: u32) -> ArrayView1<'_, f32> {
        self.weights.row(id as usize)
    }

    pub fn is_zero_row(&self, id: u32) -> bool {
        self.row(id).iter().all(|&v| v == 0.0)
    }

    /// Row-major copy of all weights, ready for a tensor of shape [rows, dim].
    pub fn to_flat_vec(&self) -> Vec<f32> {
        self.weights.iter().copied().collect()
    }
}

/// Counters reported after reading a vector file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbeddingLoadStats {
    /// Lines read, header included
    pub lines:      usize,
    /// Vocabulary rows filled from the file
    pub matched:    usize,
    /// Lines skipped as malformed
    pub malformed:  usize,
    /// Later occurrences of an already-filled token
    pub duplicates: usize,
}

impl EmbeddingLoadStats {
    /// Fraction of vocabulary tokens that received a vector.
    pub fn coverage(&self, vocab: &Vocabulary) -> f64 {
        if vocab.is_empty() {
            0.0
        } else {
            self.matched as f64 / vocab.len() as f64
        }
    }
}

pub struct EmbeddingLoader {
    dim: usize,
}

impl EmbeddingLoader {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Stream a vector file from disk. A missing file is an error.
    pub fn load_file(
        &self,
        path:  &Path,
        vocab: &Vocabulary,
    ) -> Result<(EmbeddingMatrix, EmbeddingLoadStats)> {
        let file = File::open(path).with_context(|| {
            format!("Cannot open pretrained vector file '{}'", path.display())
        })?;
        tracing::info!("Reading word vectors from '{}' (dim={})", path.display(), self.dim);

        let (matrix, stats) = self
            .load(BufReader::new(file), vocab)
            .with_context(|| format!("Failed while reading '{}'", path.display()))?;

        if stats.malformed > 0 {
            tracing::warn!("Skipped {} malformed lines in '{}'", stats.malformed, path.display());
        }
        if stats.duplicates > 0 {
            tracing::warn!(
                "Ignored {} repeated tokens in '{}' (first occurrence kept)",
                stats.duplicates,
                path.display()
            );
        }
        tracing::info!(
            "Embedding matrix {}x{}: {} of {} tokens have vectors ({:.1}%)",
            matrix.rows(),
            matrix.dim(),
            stats.matched,
            vocab.len(),
            stats.coverage(vocab) * 100.0,
        );
        Ok((matrix, stats))
    }

    /// Stream vectors from any buffered reader.
    pub fn load<R: BufRead>(
        &self,
        reader: R,
        vocab:  &Vocabulary,
    ) -> Result<(EmbeddingMatrix, EmbeddingLoadStats)> {
        let mut matrix = EmbeddingMatrix::zeros(vocab.embedding_rows(), self.dim);
        let mut filled = vec![false; vocab.embedding_rows()];
        let mut stats  = EmbeddingLoadStats::default();

        let progress = ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} word vectors: {pos} lines [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        for raw in reader.split(b'\n') {
            let raw = raw.context("I/O error while streaming vectors")?;
            stats.lines += 1;
            if stats.lines % 50_000 == 0 {
                progress.set_position(stats.lines as u64);
            }

            let Ok(line) = std::str::from_utf8(&raw) else {
                self.skip_malformed(&mut stats, "invalid UTF-8");
                continue;
            };
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(token) = fields.next() else { continue };
            let values: Vec<&str> = fields.collect();

            if stats.lines == 1 && is_header(token, &values, self.dim, vocab) {
                tracing::debug!("Skipping vector file header '{}'", line);
                continue;
            }

            if values.len() < self.dim {
                self.skip_malformed(&mut stats, line);
                continue;
            }

            let Some(id) = vocab.id(token) else { continue };

            if filled[id as usize] {
                stats.duplicates += 1;
                continue;
            }

            let parsed: Result<Vec<f32>, _> =
                values[..self.dim].iter().map(|v| v.parse::<f32>()).collect();
            let Ok(vector) = parsed else {
                self.skip_malformed(&mut stats, line);
                continue;
            };

            for (cell, value) in matrix.weights.row_mut(id as usize).iter_mut().zip(vector) {
                *cell = value;
            }
            filled[id as usize] = true;
            stats.matched += 1;
        }

        progress.finish_and_clear();
        Ok((matrix, stats))
    }

    fn skip_malformed(&self, stats: &mut EmbeddingLoadStats, line: &str) {
        stats.malformed += 1;
        if stats.malformed <= MALFORMED_LOG_LIMIT {
            let preview: String = line.chars().take(60).collect();
            tracing::debug!("Malformed vector line {}: '{}'", stats.lines, preview);
        }
    }
}

/// word2vec / fastText `.vec` files open with "<count> <dim>".
fn is_header(token: &str, values: &[&str], dim: usize, vocab: &Vocabulary) -> bool {
    let [width] = values else { return false };
    if token.parse::<usize>().is_err() || width.parse::<usize>().ok() != Some(dim) {
        return false;
    }
    dim > 1 || vocab.id(token).is_none()
}
