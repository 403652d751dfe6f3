// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw CSV rows to tensor batches.
//
// The pipeline flows in this order:
//
//   train.csv / test.csv
//       │
//       ▼
//   CsvExampleSource  → typed Example { text, label } records
//       │
//       ▼
//   TextCleaner       → strips #hashtags / @mentions, tokenises
//       │
//       ▼
//   Vocabulary        → token → id, fit on train + test
//       │
//       ▼
//   SequenceEncoder   → fixed-length, left-padded id arrays
//       │
//       ▼
//   SentimentDataset  → implements Burn's Dataset trait
//       │
//       ▼
//   SentimentBatcher  → stacks items into [batch, seq_len] tensors
//
// Alongside the text path, EmbeddingLoader streams the
// pretrained vector file into an EmbeddingMatrix indexed by
// the same vocabulary ids.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads labelled examples from CSV files
pub mod loader;

/// Hashtag/mention removal and word tokenisation
pub mod preprocessor;

/// Frequency-ordered token → id mapping
pub mod vocabulary;

/// Token ids → fixed-length padded sequences
pub mod encoder;

/// Pretrained vector file → embedding matrix
pub mod embeddings;

/// Implements Burn's Dataset trait for encoded examples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
