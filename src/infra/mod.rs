// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence that several layers share:
//
//   checkpoint.rs — The checkpoint directory: weights (Burn's
//                   NamedMpkFileRecorder), TrainConfig and
//                   Vocabulary as JSON, the newest-epoch
//                   pointer, and the final evaluation report.
//
//   metrics.rs    — Per-epoch loss / accuracy rows written to
//                   metrics.csv for plotting learning curves.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Checkpoint directory: weights, config, vocabulary, report
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
