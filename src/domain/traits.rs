// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams of the pipeline. Everything above this layer
// programs against these traits, so a new loader or a new
// tokeniser is a new impl, not a change to the preprocessor.
//
//   DialogSource          — where dialogue records come from
//   TokenizationStrategy  — turn content → fixed-length ids/mask
//   SubwordModel          — the external text → subword-id model
//                           wrapped by the subword strategy
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Trait Objects)

use std::fmt::Debug;

use anyhow::Result;

use crate::domain::dialog::{DialogRecord, TokenizedTurn, TurnInput};
use crate::domain::error::PreprocessError;

// ─── DialogSource ─────────────────────────────────────────────────────────────
/// Any component that can load dialogue records.
///
/// Implementations:
///   - JsonDialogLoader → .json array or .jsonl file of records
pub trait DialogSource {
    fn load_all(&self) -> Result<Vec<DialogRecord>>;
}

// ─── TokenizationStrategy ─────────────────────────────────────────────────────
/// Converts one turn's content into a `TokenizedTurn` of exactly
/// `seq_length()` positions.
///
/// Implementations:
///   - IndexTokenizer   → pads pre-tokenised ids
///   - SubwordTokenizer → delegates to a `SubwordModel`
///
/// The preprocessor holds one of these behind an `Arc` and may be
/// called from several loader workers at once, hence `Send + Sync`.
pub trait TokenizationStrategy: Debug + Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Raw batch field this strategy reads turn content from
    fn input_field(&self) -> &'static str;

    /// Fixed output length of every tokenised turn
    fn seq_length(&self) -> usize;

    fn tokenize(&self, input: TurnInput<'_>) -> Result<TokenizedTurn, PreprocessError>;

    /// Filler used where a position has no turn to show
    /// (the last position of the shifted view).
    fn empty_turn(&self) -> TokenizedTurn {
        TokenizedTurn::empty(self.seq_length(), 0)
    }
}

// ─── SubwordModel ─────────────────────────────────────────────────────────────
/// An external text-to-subword model (e.g. a BERT preprocessor).
/// It owns its own truncation and padding; `max_seq_length` is
/// fixed when the handle is built, not passed per call.
///
/// Implementations:
///   - BertPreprocessor → `tokenizers` word-level vocabulary with
///                        [CLS]/[SEP] post-processing
pub trait SubwordModel: Debug + Send + Sync {
    fn max_seq_length(&self) -> usize;

    fn encode(&self, text: &str) -> Result<TokenizedTurn>;
}
