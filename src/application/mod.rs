// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per use case: train, evaluate, or predict.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - No direct file formats (that's Layers 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Load → clean → vocabulary → encode → embed → train → test
pub mod train_use_case;

// Re-score a saved model on any labelled CSV
pub mod evaluate_use_case;

// Classify single texts with a saved model
pub mod predict_use_case;
