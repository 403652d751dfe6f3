// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch Adam over the training split, one validation pass
// per epoch, and a checkpoint after every epoch.
//
//   - Training runs on an Autodiff backend, which is also what
//     switches the recurrent dropout masks on
//   - model.valid() hands back the same weights on the inner
//     backend: no autodiff graph, no dropout
//   - The validation batcher must use that inner backend too
//   - argmax(1) returns [batch, 1], flattened before .equal()
//
// The embedding never trains: its parameter is marked no-grad
// and the lookup is detached, so Adam only ever sees the
// recurrent cells and the dense layer.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::SentimentBatcher, dataset::SentimentDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::SentimentRnn;

/// Train `model` for `cfg.epochs` epochs and return it on the inner
/// backend, ready for evaluation.
pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    mut model:     SentimentRnn<B>,
    train_dataset: SentimentDataset,
    val_dataset:   SentimentDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &mut MetricsLogger,
    device:        &B::Device,
) -> Result<SentimentRnn<B::InnerBackend>> {
    tracing::info!(
        "Training {} {} cell(s), hidden={}, on {:?}",
        if model.backward_cell.is_some() { "bidirectional" } else { "unidirectional" },
        cfg.cell,
        cfg.hidden_size,
        device,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(SentimentBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend, no autodiff overhead) ───────────
    let val_loader = DataLoaderBuilder::new(SentimentBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(val_dataset);

    let mut best_val_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let loss = model.forward_loss(batch.token_ids, batch.targets);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum  = 0.0f64;
        let mut val_batches   = 0usize;
        let mut correct       = 0usize;
        let mut total_samples = 0usize;

        for batch in val_loader.iter() {
            let output = model_valid.forward_classification(batch.token_ids, batch.targets);

            val_loss_sum += output.loss.into_scalar().elem::<f64>();
            val_batches  += 1;

            total_samples += output.targets.dims()[0];
            let hits: i64 = output
                .logits
                .argmax(1)
                .flatten::<1>(0, 1)
                .equal(output.targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            correct += hits as usize;
        }

        let avg_val_loss = if val_batches   > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let val_acc      = if total_samples > 0 { correct as f64 / total_samples as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, val_acc * 100.0,
        );

        let row = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, val_acc);
        if row.is_improvement(best_val_loss) {
            best_val_loss = avg_val_loss;
            tracing::info!("Epoch {} has the lowest validation loss so far", epoch);
        }
        metrics.log(&row)?;

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete! Metrics in '{}'", metrics.csv_path().display());
    Ok(model.valid())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::data::dataset::SentimentItem;
    use crate::infra::metrics::read_metrics;
    use crate::ml::model::SentimentRnnConfig;

    type AB = Autodiff<NdArray>;

    fn items() -> Vec<SentimentItem> {
        (0..12)
            .map(|i| SentimentItem::new(vec![0, (i % 5) as u32 + 1, (i % 3) as u32 + 1], i % 3))
            .collect()
    }

    #[test]
    fn test_writes_one_checkpoint_and_metrics_row_per_epoch() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::create(dir.path()).unwrap();
        let mut metrics = MetricsLogger::create(dir.path()).unwrap();
        let device = Default::default();

        let cfg = TrainConfig {
            epochs:      2,
            batch_size:  4,
            hidden_size: 3,
            ..TrainConfig::default()
        };
        let model = SentimentRnnConfig::new(6, 4, 3, 3).init::<AB>(&device);

        let trained = run_training(
            &cfg,
            model,
            SentimentDataset::new(items()),
            SentimentDataset::new(items()[..4].to_vec()),
            &ckpt,
            &mut metrics,
            &device,
        )
        .unwrap();

        assert_eq!(ckpt.latest_epoch().unwrap(), 2);
        let rows = read_metrics(metrics.csv_path()).unwrap();
        assert_eq!(rows.iter().map(|r| r.epoch).collect::<Vec<_>>(), vec![1, 2]);
        assert!(rows.iter().all(|r| r.train_loss.is_finite() && (0.0..=1.0).contains(&r.val_acc)));

        let ids = Tensor::<NdArray, 1, Int>::from_ints([0, 1, 2].as_slice(), &device).reshape([1, 3]);
        assert_eq!(trained.forward(ids).dims(), [1, 3]);
    }

    #[test]
    fn test_empty_validation_set_is_tolerated() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::create(dir.path()).unwrap();
        let mut metrics = MetricsLogger::create(dir.path()).unwrap();
        let device = Default::default();
        let cfg    = TrainConfig { epochs: 1, batch_size: 8, ..TrainConfig::default() };
        let model  = SentimentRnnConfig::new(6, 2, 2, 3).init::<AB>(&device);

        run_training(
            &cfg,
            model,
            SentimentDataset::new(items()),
            SentimentDataset::new(Vec::new()),
            &ckpt,
            &mut metrics,
            &device,
        )
        .unwrap();

        let rows = read_metrics(metrics.csv_path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].val_acc, 0.0);
    }
}
