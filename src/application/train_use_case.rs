// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train + test CSVs           (Layer 4 - data)
//   Step 2: Clean and tokenize every text    (Layer 4 - data)
//   Step 3: Fit vocabulary on train + test   (Layer 4 - data)
//   Step 4: Encode to fixed-length sequences (Layer 4 - data)
//   Step 5: Build the embedding matrix       (Layer 4 - data)
//   Step 6: Split train / validation         (Layer 4 - data)
//   Step 7: Save config + vocabulary         (Layer 6 - infra)
//   Step 8: Run the training loop            (Layer 5 - ml)
//   Step 9: Evaluate on the test set         (Layer 5 - ml)
//
// The vocabulary sees the test texts as well as the training
// texts, so no test token is ever out-of-vocabulary. That is a
// mild leak (test words get embedding rows) but the test labels
// are never looked at before Step 9.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use std::path::PathBuf;

use anyhow::{bail, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{SentimentDataset, SentimentItem},
    embeddings::{EmbeddingLoader, EmbeddingMatrix},
    encoder::SequenceEncoder,
    loader::{label_histogram, CsvExampleSource},
    preprocessor::TextCleaner,
    splitter::split_train_val,
    vocabulary::Vocabulary,
};
use crate::domain::{
    cell_kind::CellKind,
    error::PipelineError,
    evaluation::EvaluationReport,
    example::{Example, LabelScheme},
    traits::ExampleSource,
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    default_device, evaluator::evaluate, model::SentimentRnnConfig, trainer::run_training,
    Device, TrainingBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a run. Written to train_config.json before training
// starts and read back by `evaluate` and `predict`, so it must hold
// everything needed to rebuild the model and re-encode a text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    // ── Inputs ──
    pub train_path:         PathBuf,
    pub test_path:          PathBuf,
    pub vectors_path:       PathBuf,
    pub checkpoint_dir:     PathBuf,
    pub text_column:        String,
    pub train_label_column: String,
    pub test_label_column:  String,
    pub class_names:        Vec<String>,

    // ── Text pipeline ──
    pub lowercase:          bool,
    pub max_seq_len:        usize,
    pub embedding_dim:      usize,
    /// Vocabulary size + 1; filled in once the vocabulary is fit
    pub embedding_rows:     usize,

    // ── Architecture ──
    pub hidden_size:        usize,
    pub bidirectional:      bool,
    pub cell:               CellKind,
    pub dropout:            f64,
    pub recurrent_dropout:  f64,

    // ── Optimisation ──
    pub batch_size:         usize,
    pub epochs:             usize,
    pub lr:                 f64,
    pub val_fraction:       f64,
    pub seed:               u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_path:         PathBuf::from("data/train.csv"),
            test_path:          PathBuf::from("data/test.csv"),
            vectors_path:       PathBuf::from("data/vectors.txt"),
            checkpoint_dir:     PathBuf::from("checkpoints"),
            text_column:        "text".to_string(),
            train_label_column: "sentiment".to_string(),
            test_label_column:  "sentiment".to_string(),
            class_names:        LabelScheme::default().names().to_vec(),
            lowercase:          true,
            max_seq_len:        500,
            embedding_dim:      300,
            embedding_rows:     0,
            hidden_size:        128,
            bidirectional:      true,
            cell:               CellKind::Gru,
            dropout:            0.2,
            recurrent_dropout:  0.2,
            batch_size:         128,
            epochs:             15,
            lr:                 1e-3,
            val_fraction:       0.1,
            seed:               42,
        }
    }
}

impl TrainConfig {
    pub fn label_scheme(&self) -> LabelScheme {
        LabelScheme::new(self.class_names.clone())
    }

    pub fn cleaner(&self) -> TextCleaner {
        TextCleaner::new(self.lowercase)
    }

    pub fn encoder(&self) -> SequenceEncoder {
        SequenceEncoder::new(self.max_seq_len)
    }

    /// Architecture for a vocabulary with `embedding_rows` rows.
    pub fn model_config(&self, embedding_rows: usize) -> SentimentRnnConfig {
        SentimentRnnConfig::new(
            embedding_rows,
            self.embedding_dim,
            self.hidden_size,
            self.class_names.len(),
        )
        .with_bidirectional(self.bidirectional)
        .with_cell(self.cell)
        .with_dropout(self.dropout)
        .with_recurrent_dropout(self.recurrent_dropout)
    }

    /// Reject settings that would only fail later, deep inside training.
    pub fn validate(&self) -> Result<()> {
        if self.class_names.len() < 2 {
            bail!("at least two classes are required, got {:?}", self.class_names);
        }
        for (name, value) in [
            ("max_seq_len", self.max_seq_len),
            ("embedding_dim", self.embedding_dim),
            ("hidden_size", self.hidden_size),
            ("batch_size", self.batch_size),
            ("epochs", self.epochs),
        ] {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }
        for (name, p) in [("dropout", self.dropout), ("recurrent_dropout", self.recurrent_dropout)] {
            if !(0.0..1.0).contains(&p) {
                bail!("{name} must be in [0, 1), got {p}");
            }
        }
        if !(0.0..1.0).contains(&self.val_fraction) {
            bail!("val_fraction must be in [0, 1), got {}", self.val_fraction);
        }
        if self.lr.is_nan() || self.lr <= 0.0 {
            bail!("lr must be positive, got {}", self.lr);
        }
        Ok(())
    }
}

/// Tokenize every example, turn it into a fixed-length item with a
/// zero-based target.
pub fn encode_examples(
    examples: &[Example],
    tokens:   &[Vec<String>],
    vocab:    &Vocabulary,
    encoder:  &SequenceEncoder,
    scheme:   &LabelScheme,
) -> Result<Vec<SentimentItem>> {
    examples
        .iter()
        .zip(tokens)
        .map(|(example, tokens)| {
            let target = scheme.to_index(example.label)?;
            Ok(SentimentItem::new(encoder.encode(tokens, vocab), target))
        })
        .collect()
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
    device: Device,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config, device: default_device() }
    }

    /// Execute the full pipeline; returns the test-set report.
    pub fn execute(&self) -> Result<EvaluationReport> {
        let mut cfg = self.config.clone();
        cfg.validate()?;
        let scheme = cfg.label_scheme();

        // ── Step 1: Load both datasets ────────────────────────────────────────
        // Both files are validated (columns, labels) before any work starts
        let train_examples = CsvExampleSource::new(
            &cfg.train_path, &cfg.text_column, &cfg.train_label_column, scheme.clone(),
        ).load_all()?;
        let test_examples = CsvExampleSource::new(
            &cfg.test_path, &cfg.text_column, &cfg.test_label_column, scheme.clone(),
        ).load_all()?;
        tracing::info!(
            "Class counts: train {:?}, test {:?}",
            label_histogram(&train_examples, scheme.num_classes()),
            label_histogram(&test_examples, scheme.num_classes()),
        );

        // ── Step 2: Clean + tokenize ──────────────────────────────────────────
        let cleaner      = cfg.cleaner();
        let train_tokens = cleaner.clean_all(train_examples.iter().map(|e| e.text.as_str()))?;
        let test_tokens  = cleaner.clean_all(test_examples.iter().map(|e| e.text.as_str()))?;

        // ── Step 3: Vocabulary over train + test ──────────────────────────────
        let vocab = Vocabulary::build(train_tokens.iter().chain(&test_tokens));
        if vocab.is_empty() {
            bail!("No tokens left after cleaning '{}' and '{}'", cfg.train_path.display(), cfg.test_path.display());
        }
        cfg.embedding_rows = vocab.embedding_rows();
        tracing::info!("Vocabulary: {} tokens", vocab.len());

        // ── Step 4: Encode ────────────────────────────────────────────────────
        let encoder     = cfg.encoder();
        let train_items = encode_examples(&train_examples, &train_tokens, &vocab, &encoder, &scheme)?;
        let test_items  = encode_examples(&test_examples, &test_tokens, &vocab, &encoder, &scheme)?;

        // ── Step 5: Embedding matrix ──────────────────────────────────────────
        let (matrix, _stats) = EmbeddingLoader::new(cfg.embedding_dim).load_file(&cfg.vectors_path, &vocab)?;

        // ── Step 6: Train / validation split ──────────────────────────────────
        let (train_items, val_items) = split_train_val(train_items, 1.0 - cfg.val_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            train_items.len(),
            val_items.len(),
            test_items.len(),
        );

        // ── Step 7: Persist what inference needs ──────────────────────────────
        let ckpt = CheckpointManager::create(&cfg.checkpoint_dir)?;
        ckpt.save_config(&cfg)?;
        ckpt.save_vocabulary(&vocab)?;
        let mut metrics = MetricsLogger::create(&cfg.checkpoint_dir)?;

        // ── Step 8: Train ─────────────────────────────────────────────────────
        let weights = embedding_tensor::<TrainingBackend>(&matrix, cfg.embedding_dim, &self.device)?;
        let model   = cfg
            .model_config(cfg.embedding_rows)
            .init_with_embeddings::<TrainingBackend>(weights, &self.device);

        let model = run_training(
            &cfg,
            model,
            SentimentDataset::new(train_items),
            SentimentDataset::new(val_items),
            &ckpt,
            &mut metrics,
            &self.device,
        )?;

        // ── Step 9: Evaluate on the held-out test set ─────────────────────────
        let report = evaluate(
            &model,
            &SentimentDataset::new(test_items),
            cfg.batch_size,
            &scheme,
            &self.device,
        );
        let path = ckpt.save_evaluation(&report)?;
        tracing::info!("Evaluation written to '{}'", path.display());

        Ok(report)
    }
}

/// EmbeddingMatrix → [rows, dim] float tensor.
pub fn embedding_tensor<B: Backend>(
    matrix: &EmbeddingMatrix,
    dim:    usize,
    device: &B::Device,
) -> Result<Tensor<B, 2>> {
    if matrix.dim() != dim {
        return Err(PipelineError::EmbeddingDimMismatch { expected: dim, actual: matrix.dim() }.into());
    }
    let data = TensorData::new(matrix.to_flat_vec(), [matrix.rows(), matrix.dim()]);
    Ok(Tensor::from_data(data, device))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = TrainConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.class_names.len(), 5);
        assert_eq!(cfg.max_seq_len, 500);
        assert_eq!(cfg.embedding_dim, 300);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            TrainConfig { epochs: 0, ..TrainConfig::default() },
            TrainConfig { dropout: 1.0, ..TrainConfig::default() },
            TrainConfig { val_fraction: 1.0, ..TrainConfig::default() },
            TrainConfig { lr: 0.0, ..TrainConfig::default() },
            TrainConfig { class_names: vec!["only".into()], ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err());
        }
    }

    #[test]
    fn test_model_config_follows_train_config() {
        let cfg = TrainConfig {
            hidden_size:   16,
            bidirectional: false,
            cell:          CellKind::Lstm,
            ..TrainConfig::default()
        };
        let model_cfg = cfg.model_config(42);
        assert_eq!(model_cfg.vocab_size, 42);
        assert_eq!(model_cfg.hidden_size, 16);
        assert_eq!(model_cfg.num_classes, 5);
        assert!(!model_cfg.bidirectional);
        assert_eq!(model_cfg.cell, CellKind::Lstm);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: TrainConfig = serde_json::from_str(r#"{"epochs": 2, "cell": "lstm"}"#).unwrap();
        assert_eq!(cfg.epochs, 2);
        assert_eq!(cfg.cell, CellKind::Lstm);
        assert_eq!(cfg.batch_size, 128);
    }

    #[test]
    fn test_encode_examples_shifts_labels() {
        let vocab    = Vocabulary::from_tokens(vec!["pizza".into(), "cold".into()]);
        let examples = vec![Example::new("pizza cold", 5), Example::new("cold", 1)];
        let tokens   = vec![vec!["pizza".to_string(), "cold".to_string()], vec!["cold".to_string()]];
        let items = encode_examples(&examples, &tokens, &vocab, &SequenceEncoder::new(3), &LabelScheme::default())
            .unwrap();
        assert_eq!(items[0], SentimentItem::new(vec![0, 1, 2], 4));
        assert_eq!(items[1], SentimentItem::new(vec![0, 0, 2], 0));
    }

    #[test]
    fn test_embedding_tensor_checks_dimension() {
        let device = Default::default();
        let matrix = EmbeddingMatrix::zeros(3, 4);
        assert_eq!(embedding_tensor::<NdArray>(&matrix, 4, &device).unwrap().dims(), [3, 4]);
        let err = embedding_tensor::<NdArray>(&matrix, 5, &device).unwrap_err();
        assert_eq!(
            err.downcast::<PipelineError>().unwrap(),
            PipelineError::EmbeddingDimMismatch { expected: 5, actual: 4 }
        );
    }

    #[test]
    fn test_execute_trains_evaluates_and_reloads() {
        use crate::application::predict_use_case::PredictUseCase;

        let dir = tempfile::tempdir().unwrap();
        let train = dir.path().join("train.csv");
        let test  = dir.path().join("test.csv");
        let vecs  = dir.path().join("vectors.txt");
        let ckpt_dir = dir.path().join("run");

        std::fs::write(
            &train,
            "text,sentiment\n\
             awful cold pizza #fail,1\n\
             late and cold @shop,1\n\
             not good at all,2\n\
             pizza was late,2\n\
             it was pizza,3\n\
             ok pizza,3\n\
             good hot pizza,4\n\
             great service,5\n",
        )
        .unwrap();
        // Different label column, names instead of numbers
        std::fs::write(&test, "text,Emotion\ncold pizza again!,very negative\ngreat pizza,Very Positive\n").unwrap();
        std::fs::write(&vecs, "3 3\ncold -1 0 0.5\ngreat 1 0.5 0\npizza 0 1 0\n").unwrap();

        let cfg = TrainConfig {
            train_path:        train,
            test_path:         test,
            vectors_path:      vecs,
            checkpoint_dir:    ckpt_dir.clone(),
            test_label_column: "Emotion".into(),
            embedding_dim:     3,
            hidden_size:       4,
            max_seq_len:       8,
            batch_size:        4,
            epochs:            2,
            val_fraction:      0.25,
            ..TrainConfig::default()
        };
        let report = TrainUseCase::new(cfg).execute().unwrap();

        assert_eq!(report.total, 2);
        let row_sums: Vec<usize> = report.confusion_matrix.iter().map(|row| row.iter().sum()).collect();
        assert_eq!(row_sums, vec![1, 0, 0, 0, 1]);
        assert!((0.0..=1.0).contains(&report.accuracy));

        assert!(ckpt_dir.join("evaluation.json").exists());
        assert!(ckpt_dir.join("vocabulary.json").exists());
        assert!(ckpt_dir.join("metrics.csv").exists());

        let ckpt  = CheckpointManager::open(&ckpt_dir).unwrap();
        let saved = ckpt.load_config().unwrap();
        assert_eq!(saved.embedding_rows, ckpt.load_vocabulary().unwrap().embedding_rows());
        assert_eq!(ckpt.latest_epoch().unwrap(), 2);

        // "unbelievable" is in neither CSV
        let p = PredictUseCase::new(&ckpt_dir).unwrap().predict("cold pizza, unbelievable").unwrap();
        assert_eq!(p.probabilities.len(), 5);
        assert!((p.probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((1..=5).contains(&p.label));
        assert_eq!(p.unknown_tokens, 1);
    }
}
