// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Everything a finished run leaves behind lives in one
// directory, so evaluation and inference can rebuild exactly
// the model that was trained:
//
//   checkpoints/
//     train_config.json     ← hyperparameters, architecture included
//     vocabulary.json       ← token → id mapping
//     model_epoch_1.mpk     ← weights after epoch 1
//     model_epoch_2.mpk
//     ...
//     latest_epoch.json     ← number of the newest weights file
//     metrics.csv           ← written by MetricsLogger
//     evaluation.json       ← final test-set report
//
// Weights go through Burn's NamedMpkFileRecorder with full
// precision, so a reloaded model gives bit-identical outputs.
// Loading fails if the record doesn't match the architecture
// rebuilt from train_config.json.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::vocabulary::Vocabulary;
use crate::domain::{evaluation::EvaluationReport, traits::Persistable};
use crate::ml::model::SentimentRnn;

const CONFIG_FILE:     &str = "train_config.json";
const VOCABULARY_FILE: &str = "vocabulary.json";
const LATEST_FILE:     &str = "latest_epoch.json";
const EVALUATION_FILE: &str = "evaluation.json";

type WeightsRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Saves and restores every artifact of a training run.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Use `dir` for a new run, creating it (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Use an existing checkpoint directory for evaluation or inference.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            anyhow::bail!(
                "Checkpoint directory '{}' does not exist. Have you run 'train' first?",
                dir.display()
            );
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn weights_path(&self, epoch: usize) -> PathBuf {
        // The recorder appends the .mpk extension itself
        self.dir.join(format!("model_epoch_{epoch}"))
    }

    // ── Weights ───────────────────────────────────────────────────────────────

    /// Write the weights for `epoch` and point latest_epoch.json at them.
    pub fn save_model<B: Backend>(&self, model: &SentimentRnn<B>, epoch: usize) -> Result<()> {
        let path = self.weights_path(epoch);

        WeightsRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest = self.dir.join(LATEST_FILE);
        fs::write(&latest, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", latest.display()))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the newest weights into `model`, which must already have
    /// the architecture they were saved from.
    pub fn load_model<B: Backend>(
        &self,
        model:  SentimentRnn<B>,
        device: &B::Device,
    ) -> Result<SentimentRnn<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.weights_path(epoch);

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = WeightsRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

        Ok(model.load_record(record))
    }

    /// Number of the newest saved epoch.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join(LATEST_FILE);
        let s = fs::read_to_string(&path).with_context(|| {
            format!("Cannot find '{}'. Have you run 'train' first?", path.display())
        })?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure 'train' finished before 'predict' or 'evaluate'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed training config '{}'", path.display()))
    }

    // ── Vocabulary ────────────────────────────────────────────────────────────

    pub fn save_vocabulary(&self, vocab: &Vocabulary) -> Result<()> {
        vocab.save(&self.dir.join(VOCABULARY_FILE))
    }

    pub fn load_vocabulary(&self) -> Result<Vocabulary> {
        Vocabulary::load(&self.dir.join(VOCABULARY_FILE))
    }

    // ── Evaluation report ─────────────────────────────────────────────────────

    pub fn save_evaluation(&self, report: &EvaluationReport) -> Result<PathBuf> {
        let path = self.dir.join(EVALUATION_FILE);
        fs::write(&path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("Cannot write evaluation to '{}'", path.display()))?;
        Ok(path)
    }

    #[cfg(test)]
    pub fn load_evaluation(&self) -> Result<EvaluationReport> {
        let path = self.dir.join(EVALUATION_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read evaluation from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::domain::evaluation::ConfusionMatrix;
    use crate::ml::model::SentimentRnnConfig;

    type B = NdArray;

    fn tokens(device: &<B as Backend>::Device) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints([0, 4, 2, 9, 1, 1, 0, 3].as_slice(), device).reshape([2, 4])
    }

    #[test]
    fn test_saved_model_reloads_with_identical_predictions() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::create(dir.path().join("run")).unwrap();
        let device = Default::default();
        let cfg    = SentimentRnnConfig::new(10, 4, 3, 5);

        let trained = cfg.init::<B>(&device);
        ckpt.save_model(&trained, 3).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 3);

        // A fresh model has different random weights until the record is applied
        let reloaded = ckpt.load_model(cfg.init::<B>(&device), &device).unwrap();

        let before: Vec<f32> = trained.forward(tokens(&device)).into_data().iter::<f32>().collect();
        let after: Vec<f32>  = reloaded.forward(tokens(&device)).into_data().iter::<f32>().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_latest_epoch_follows_newest_save() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::create(dir.path()).unwrap();
        let device = Default::default();
        let model  = SentimentRnnConfig::new(6, 2, 2, 3).init::<B>(&device);
        ckpt.save_model(&model, 1).unwrap();
        ckpt.save_model(&model, 2).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 2);
        assert!(dir.path().join("model_epoch_1.mpk").exists());
        assert!(dir.path().join("model_epoch_2.mpk").exists());
    }

    #[test]
    fn test_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::create(dir.path()).unwrap();
        let cfg  = TrainConfig { epochs: 3, hidden_size: 16, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.epochs, 3);
        assert_eq!(loaded.hidden_size, 16);
        assert_eq!(loaded.class_names, cfg.class_names);
    }

    #[test]
    fn test_vocabulary_and_evaluation_files() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::create(dir.path()).unwrap();

        let vocab = Vocabulary::from_tokens(vec!["pizza".into(), "cold".into()]);
        ckpt.save_vocabulary(&vocab).unwrap();
        assert_eq!(ckpt.load_vocabulary().unwrap().id("cold"), Some(2));

        let matrix = ConfusionMatrix::from_predictions(&[0, 1, 1], &[0, 1, 0], 2);
        let report = EvaluationReport::from_matrix(&matrix, vec!["neg".into(), "pos".into()]);
        ckpt.save_evaluation(&report).unwrap();
        assert_eq!(ckpt.load_evaluation().unwrap().confusion_matrix, vec![vec![1, 0], vec![1, 1]]);
    }

    #[test]
    fn test_open_requires_existing_directory() {
        assert!(CheckpointManager::open("/nonexistent/checkpoints").is_err());
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::open(dir.path()).unwrap();
        // Nothing trained yet
        assert!(ckpt.latest_epoch().is_err());
        assert!(ckpt.load_config().is_err());
    }
}
