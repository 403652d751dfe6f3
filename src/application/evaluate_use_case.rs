// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Scores a saved model on any labelled CSV:
//
//   Step 1: Rebuild the model + vocabulary  (Layer 5 - ml)
//   Step 2: Load the CSV                    (Layer 4 - data)
//   Step 3: Clean + encode with the saved
//           cleaner settings and length     (Layer 4 - data)
//   Step 4: Predict + confusion matrix      (Layer 5 - ml)
//
// Column names and batch size default to what the run was
// trained with; the test label column is the default because
// a held-out file is the usual thing to re-score.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::train_use_case::encode_examples;
use crate::data::{dataset::SentimentDataset, loader::CsvExampleSource};
use crate::domain::{evaluation::EvaluationReport, traits::ExampleSource};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{default_device, evaluator::evaluate, inferencer::Inferencer};

#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub checkpoint_dir: PathBuf,
    pub data_path:      PathBuf,
    pub text_column:    Option<String>,
    pub label_column:   Option<String>,
    pub batch_size:     Option<usize>,
    /// Where to write the report as JSON, if anywhere
    pub output:         Option<PathBuf>,
}

pub struct EvaluateUseCase {
    request: EvaluateRequest,
}

impl EvaluateUseCase {
    pub fn new(request: EvaluateRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<EvaluationReport> {
        let req = &self.request;

        // ── Step 1: Model, vocabulary and saved settings ──────────────────────
        let ckpt       = CheckpointManager::open(&req.checkpoint_dir)?;
        let cfg        = ckpt.load_config()?;
        let inferencer = Inferencer::from_checkpoint(&ckpt, default_device())?;

        // ── Step 2: Load ──────────────────────────────────────────────────────
        let text_column  = req.text_column.clone().unwrap_or(cfg.text_column);
        let label_column = req.label_column.clone().unwrap_or(cfg.test_label_column);
        let scheme       = inferencer.label_scheme().clone();
        let examples = CsvExampleSource::new(&req.data_path, text_column, label_column, scheme.clone())
            .load_all()?;

        // ── Step 3: Clean + encode ────────────────────────────────────────────
        let tokens = inferencer
            .cleaner()
            .clean_all(examples.iter().map(|e| e.text.as_str()))?;
        let items = encode_examples(&examples, &tokens, inferencer.vocabulary(), inferencer.encoder(), &scheme)?;

        // ── Step 4: Score ─────────────────────────────────────────────────────
        let report = evaluate(
            inferencer.model(),
            &SentimentDataset::new(items),
            req.batch_size.unwrap_or(cfg.batch_size),
            &scheme,
            inferencer.device(),
        );

        if let Some(path) = &req.output {
            std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
            tracing::info!("Evaluation written to '{}'", path.display());
        }
        Ok(report)
    }
}
