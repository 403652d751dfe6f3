// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Maps every token of the corpus to an integer id.
//
// Id assignment:
//   1. Count how often each token appears across the corpus
//   2. Order tokens by descending frequency; ties keep the
//      order in which the tokens were first seen
//   3. Assign ids 1, 2, 3, ... in that order
//
// Id 0 is reserved for padding and never given to a token, so
// an embedding matrix for this vocabulary has len() + 1 rows.
//
// The vocabulary is fit once on train + test together. Every
// token of either split therefore has an id; only text seen
// for the first time at `predict` can be out of vocabulary.
//
// Persisted as JSON in the checkpoint directory so inference
// reuses the exact mapping fit during training.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::traits::Persistable;

/// The reserved padding id.
pub const PAD_ID: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Tokens in id order: tokens[i] has id i + 1
    tokens: Vec<String>,

    #[serde(skip)]
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Fit a vocabulary on a tokenised corpus.
    pub fn build<'a, I>(corpus: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec<String>>,
    {
        // (count, first-seen position) per token
        let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut seen = 0usize;

        for doc in corpus {
            for token in doc {
                let entry = stats.entry(token.as_str()).or_insert_with(|| {
                    seen += 1;
                    (0, seen)
                });
                entry.0 += 1;
            }
        }

        let mut ranked: Vec<(&str, (usize, usize))> = stats.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

        let tokens: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        tracing::debug!("Vocabulary fit: {} distinct tokens", tokens.len());
        Self::from_tokens(tokens)
    }

    /// Rebuild from tokens already in id order.
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32 + 1))
            .collect();
        Self { tokens, index }
    }

    pub fn id(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        (id as usize)
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(String::as_str)
    }

    /// Number of real tokens (padding excluded).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rows an embedding matrix needs: one per token plus the padding row.
    pub fn embedding_rows(&self) -> usize {
        self.tokens.len() + 1
    }

    /// (token, id) pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i as u32 + 1))
    }

    /// Tokens in id order; element `i` has id `i + 1`.
    pub fn tokens_by_id(&self) -> &[String] {
        &self.tokens
    }
}

impl Persistable for Vocabulary {
    fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;
        tracing::debug!("Saved vocabulary ({} tokens) to '{}'", self.len(), path.display());
        Ok(())
    }

    fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).with_context(|| {
            format!(
                "Cannot read vocabulary from '{}'. Have you run 'train' first?",
                path.display()
            )
        })?;
        let stored: Vocabulary = serde_json::from_str(&json)
            .with_context(|| format!("Malformed vocabulary file '{}'", path.display()))?;
        // The lookup index is not serialised; rebuild it
        Ok(Self::from_tokens(stored.tokens))
    }
}
