// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Concerns used by the pipeline that are not part of the
// preprocessing contract itself:
//
//   tokenizer_store.rs — Builds or reloads the BERT-style
//                        word-level tokenizer from the corpus,
//                        and wraps it as the SubwordModel the
//                        subword strategy calls.
//
//   metrics.rs         — Per-batch statistics (valid turns,
//                        labeled turns) written to CSV.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Tokenizer building/loading and the BERT preprocessor
pub mod tokenizer_store;

/// Batch statistics CSV logger
pub mod metrics;
