// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from dialogue files to model-ready tensors.
//
//   .json / .jsonl dialogues
//       │
//       ▼
//   JsonDialogLoader   → reads DialogRecords
//       │
//       ▼
//   DialogDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   RawDialogBatch     → field-keyed batch, turns padded to
//       │                dialog_length
//       ▼
//   DataPreprocessor   → tokenises turns via the active
//       │                TokenizationStrategy and builds the
//       │                seven VRNN tensors
//       ▼
//   VrnnBatcher        → runs the above inside Burn's DataLoader
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads dialogue records from JSON / JSON-lines files
pub mod loader;

/// Implements Burn's Dataset trait for dialogue records
pub mod dataset;

/// Field-keyed raw batches and record collation
pub mod raw_batch;

/// Index and subword tokenisation strategies
pub mod tokenization;

/// Windowing, label masking and latent-state priors
pub mod preprocessor;

/// Implements Burn's Batcher trait on top of the preprocessor
pub mod batcher;

#[cfg(test)]
pub(crate) mod fixtures;
