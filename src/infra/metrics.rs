// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per training epoch so learning curves can
// be plotted after the run.
//
//   epoch,train_loss,val_loss,val_acc
//   1,1.482310,1.401277,0.388000
//   2,1.310054,1.297120,0.441000
//   ...
//
// If val_loss climbs while train_loss keeps falling, the model
// is overfitting and a lower epoch's checkpoint is the one to use.
//
// A new logger truncates the file: one metrics.csv per run.
//
// Reference: csv crate documentation (Writer, serde support)

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One row of metrics for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch number, starting at 1
    pub epoch: usize,

    /// Mean cross-entropy over the training batches
    pub train_loss: f64,

    /// Mean cross-entropy over the validation batches
    pub val_loss: f64,

    /// Fraction of validation examples classified correctly, in [0, 1]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_acc }
    }

    /// True if this epoch's val_loss beats `best_val_loss`
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

pub struct MetricsLogger {
    writer:   csv::Writer<fs::File>,
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start `{dir}/metrics.csv`, replacing any previous run's file.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        let writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create metrics file '{}'", csv_path.display()))?;

        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        Ok(Self { writer, csv_path })
    }

    /// Append one epoch's row and flush it to disk immediately.
    pub fn log(&mut self, m: &EpochMetrics) -> Result<()> {
        self.writer.serialize(m)?;
        self.writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}, val_acc={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.val_acc,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

/// Read back every row of a metrics file.
#[cfg(test)]
pub fn read_metrics(path: &Path) -> Result<Vec<EpochMetrics>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open metrics file '{}'", path.display()))?;
    let rows = reader.deserialize().collect::<Result<Vec<EpochMetrics>, _>>()?;
    Ok(rows)
}
