#![recursion_limit = "256"]

// ============================================================
// tweet-sentiment
// ============================================================
// Six layers, each depending only on the ones below it:
//
//   cli          — Layer 1: argument parsing and printing
//   application  — Layer 2: train / evaluate / predict use cases
//   domain       — Layer 3: examples, labels, metrics, traits
//   data         — Layer 4: CSV → tokens → ids → batches
//   ml           — Layer 5: Burn model, training, inference
//   infra        — Layer 6: checkpoints and metrics files

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
