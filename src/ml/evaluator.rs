// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Batched prediction over a held-out set, folded into a
// confusion matrix (rows = true class, cols = predicted class)
// and the report derived from it.
//
// Batches are taken in dataset order, so prediction i belongs
// to item i.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::{batcher::SentimentBatcher, dataset::SentimentDataset};
use crate::domain::{
    evaluation::{ConfusionMatrix, EvaluationReport},
    example::LabelScheme,
};
use crate::ml::model::SentimentRnn;

/// Arg-max output unit for every item, in dataset order.
pub fn predict_dataset<B: Backend>(
    model:      &SentimentRnn<B>,
    dataset:    &SentimentDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Vec<usize> {
    let batcher = SentimentBatcher::<B>::new(device.clone());
    let mut predictions = Vec::with_capacity(dataset.items().len());

    for chunk in dataset.items().chunks(batch_size.max(1)) {
        let batch = batcher.batch(chunk.to_vec());
        let units = model.predict(batch.token_ids);
        predictions.extend(units.into_data().iter::<i64>().map(|u| u as usize));
    }
    predictions
}

/// Score `model` on `dataset` and build the full report.
pub fn evaluate<B: Backend>(
    model:      &SentimentRnn<B>,
    dataset:    &SentimentDataset,
    batch_size: usize,
    scheme:     &LabelScheme,
    device:     &B::Device,
) -> EvaluationReport {
    let predicted = predict_dataset(model, dataset, batch_size, device);
    let matrix    = ConfusionMatrix::from_predictions(&dataset.targets(), &predicted, scheme.num_classes());
    let report    = EvaluationReport::from_matrix(&matrix, scheme.names().to_vec());

    tracing::info!(
        "Evaluated {} examples: accuracy={:.4}, micro_f1={:.4}, macro_f1={:.4}",
        report.total,
        report.accuracy,
        report.micro_f1,
        report.macro_f1,
    );
    report
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::data::dataset::SentimentItem;
    use crate::ml::model::SentimentRnnConfig;

    type B = NdArray;

    fn dataset() -> SentimentDataset {
        SentimentDataset::new(
            (0..7)
                .map(|i| SentimentItem::new(vec![0, (i % 4) as u32 + 1, 2], i % 5))
                .collect(),
        )
    }

    #[test]
    fn test_batching_does_not_change_predictions() {
        let device = Default::default();
        let model  = SentimentRnnConfig::new(5, 3, 2, 5).init::<B>(&device);
        let whole  = predict_dataset(&model, &dataset(), 100, &device);
        let small  = predict_dataset(&model, &dataset(), 3, &device);
        assert_eq!(whole.len(), 7);
        assert_eq!(whole, small);
        assert!(whole.iter().all(|&p| p < 5));
    }

    #[test]
    fn test_confusion_rows_match_true_label_counts() {
        let device = Default::default();
        let model  = SentimentRnnConfig::new(5, 3, 2, 5).init::<B>(&device);
        let data   = dataset();
        let report = evaluate(&model, &data, 4, &LabelScheme::default(), &device);

        assert_eq!(report.total, 7);
        let mut expected = vec![0usize; 5];
        for t in data.targets() {
            expected[t] += 1;
        }
        let row_sums: Vec<usize> = report.confusion_matrix.iter().map(|r| r.iter().sum()).collect();
        assert_eq!(row_sums, expected);
        assert!((report.accuracy - report.micro_f1).abs() < 1e-12);
    }
}
