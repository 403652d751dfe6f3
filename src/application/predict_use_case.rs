// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Loads the checkpoint once, then classifies any number of
// texts with it. Each Prediction carries its own timing.

use std::path::Path;

use anyhow::Result;

use crate::domain::traits::{Prediction, SentimentClassifier};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{default_device, inferencer::Inferencer};

pub struct PredictUseCase<C: SentimentClassifier = Inferencer> {
    classifier: C,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: impl AsRef<Path>) -> Result<Self> {
        let ckpt       = CheckpointManager::open(checkpoint_dir.as_ref())?;
        let inferencer = Inferencer::from_checkpoint(&ckpt, default_device())?;
        Ok(Self { classifier: inferencer })
    }
}

impl<C: SentimentClassifier> PredictUseCase<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let prediction = self.classifier.classify(text)?;
        tracing::info!(
            "Predicted class {} ({}) in {:.2?}",
            prediction.label,
            prediction.class_name,
            prediction.elapsed,
        );
        Ok(prediction)
    }

    /// Classify every text, stopping at the first failure.
    pub fn predict_all<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>> {
        texts.iter().map(|t| self.predict(t.as_ref())).collect()
    }
}
