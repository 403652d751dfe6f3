// ============================================================
// Layer 3 — Evaluation Metrics
// ============================================================
// Turns (true class, predicted class) pairs into the numbers
// reported after training:
//
//   - confusion matrix   rows = true class, cols = predicted
//   - accuracy           trace / total
//   - micro-averaged F1  from summed TP / FP / FN over classes
//   - macro-averaged F1  unweighted mean of per-class F1
//   - per-class precision, recall, F1 and support
//
// Everything works on zero-based class indices; the report
// carries class names for display only.
//
// For single-label multi-class data every false positive of
// one class is a false negative of another, so micro-F1 equals
// accuracy. It is still computed from the counts rather than
// copied, so the two can be cross-checked.

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Square count matrix over `num_classes` classes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self { counts: Array2::zeros((num_classes, num_classes)) }
    }

    /// Build from parallel slices of zero-based class indices.
    /// Pairs with an index outside the matrix are ignored.
    pub fn from_predictions(truth: &[usize], predicted: &[usize], num_classes: usize) -> Self {
        let mut matrix = Self::new(num_classes);
        for (&t, &p) in truth.iter().zip(predicted) {
            matrix.record(t, p);
        }
        matrix
    }

    pub fn record(&mut self, truth: usize, predicted: usize) {
        if let Some(cell) = self.counts.get_mut((truth, predicted)) {
            *cell += 1;
        }
    }

    pub fn num_classes(&self) -> usize {
        self.counts.nrows()
    }

    pub fn get(&self, truth: usize, predicted: usize) -> usize {
        self.counts[(truth, predicted)]
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Number of examples whose true class is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts.row(class).sum()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.counts[(class, class)]
    }

    pub fn false_positives(&self, class: usize) -> usize {
        self.counts.column(class).sum() - self.true_positives(class)
    }

    pub fn false_negatives(&self, class: usize) -> usize {
        self.support(class) - self.true_positives(class)
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.diag().sum() as f64 / total as f64
    }

    pub fn micro_f1(&self) -> f64 {
        let classes = 0..self.num_classes();
        let tp: usize = classes.clone().map(|c| self.true_positives(c)).sum();
        let fp: usize = classes.clone().map(|c| self.false_positives(c)).sum();
        let fn_: usize = classes.map(|c| self.false_negatives(c)).sum();
        f1(ratio(tp, tp + fp), ratio(tp, tp + fn_))
    }

    pub fn class_metrics(&self, class: usize) -> ClassMetrics {
        let tp = self.true_positives(class);
        let precision = ratio(tp, tp + self.false_positives(class));
        let recall    = ratio(tp, tp + self.false_negatives(class));
        ClassMetrics {
            precision,
            recall,
            f1: f1(precision, recall),
            support: self.support(class),
        }
    }

    pub fn macro_f1(&self) -> f64 {
        let n = self.num_classes();
        if n == 0 {
            return 0.0;
        }
        (0..n).map(|c| self.class_metrics(c).f1).sum::<f64>() / n as f64
    }

    pub fn to_rows(&self) -> Vec<Vec<usize>> {
        self.counts.rows().into_iter().map(|r| r.to_vec()).collect()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// Everything computed on a held-out set. Written to evaluation.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub class_names:      Vec<String>,
    pub total:            usize,
    pub accuracy:         f64,
    pub micro_f1:         f64,
    pub macro_f1:         f64,
    pub per_class:        Vec<ClassMetrics>,
    pub confusion_matrix: Vec<Vec<usize>>,
}

impl EvaluationReport {
    pub fn from_matrix(matrix: &ConfusionMatrix, class_names: Vec<String>) -> Self {
        Self {
            class_names,
            total:            matrix.total(),
            accuracy:         matrix.accuracy(),
            micro_f1:         matrix.micro_f1(),
            macro_f1:         matrix.macro_f1(),
            per_class:        (0..matrix.num_classes()).map(|c| matrix.class_metrics(c)).collect(),
            confusion_matrix: matrix.to_rows(),
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Examples: {}", self.total)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "Micro F1: {:.4}", self.micro_f1)?;
        writeln!(f, "Macro F1: {:.4}", self.macro_f1)?;
        writeln!(f)?;
        writeln!(f, "{:<16} {:>9} {:>9} {:>9} {:>9}", "class", "precision", "recall", "f1", "support")?;
        for (name, m) in self.class_names.iter().zip(&self.per_class) {
            writeln!(
                f,
                "{:<16} {:>9.4} {:>9.4} {:>9.4} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = true, cols = predicted):")?;
        for (name, row) in self.class_names.iter().zip(&self.confusion_matrix) {
            let cells: Vec<String> = row.iter().map(|c| format!("{c:>6}")).collect();
            writeln!(f, "{:<16} {}", name, cells.join(""))?;
        }
        Ok(())
    }
}
