// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the sentiment task itself:
// what an example is, how labels are named, what an
// evaluation produces, and which errors the pipeline can
// raise when its inputs are wrong.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

// A labelled tweet and the label naming scheme
pub mod example;

// Which recurrent cell the classifier uses
pub mod cell_kind;

// Typed pipeline errors (missing columns, bad labels, ...)
pub mod error;

// Confusion matrix and classification metrics
pub mod evaluation;

// Core abstractions (traits) that other layers implement
pub mod traits;
