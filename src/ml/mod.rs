// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn framework code lives here.
//
//   recurrent.rs  — GRU / LSTM cell with fused gate projections
//                   and variational input / recurrent dropout
//
//   model.rs      — The classifier: frozen embedding →
//                   bidirectional recurrent layer → dense →
//                   softmax
//
//   trainer.rs    — Mini-batch Adam training loop with a
//                   validation pass and a checkpoint per epoch
//
//   evaluator.rs  — Batched test-set prediction → confusion
//                   matrix and report
//
//   inferencer.rs — Loads a checkpoint and classifies one text
//
// Backends:
//   CPU (ndarray) by default; build with `--features wgpu` to
//   run on the GPU. Training wraps the backend in Autodiff,
//   validation and inference use the plain backend, which also
//   switches dropout off.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Cho et al. (2014) GRU, Hochreiter & Schmidhuber (1997) LSTM

pub mod recurrent;

pub mod model;

pub mod trainer;

pub mod evaluator;

pub mod inferencer;

#[cfg(not(feature = "wgpu"))]
pub type InferenceBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InferenceBackend = burn::backend::Wgpu;

pub type TrainingBackend = burn::backend::Autodiff<InferenceBackend>;

pub type Device = burn::tensor::Device<InferenceBackend>;

pub fn default_device() -> Device {
    Device::default()
}
