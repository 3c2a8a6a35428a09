// ============================================================
// Layer 4 — Tokenization Strategies
// ============================================================
// Two interchangeable ways of turning one turn into a
// fixed-length (ids, mask) pair:
//
//   IndexTokenizer   — the turn is already a list of vocabulary
//                      ids; pad with 0 up to seq_length, keep
//                      the first seq_length ids if longer.
//
//   SubwordTokenizer — the turn is raw text; hand it to an
//                      external SubwordModel which owns its
//                      own truncation/padding. We only check
//                      that what comes back is seq_length long.
//
// Example (IndexTokenizer, seq_length = 6):
//   [12, 7, 91]              → ids  [12, 7, 91, 0, 0, 0]
//                              mask [ 1, 1,  1, 0, 0, 0]
//   [1, 2, 3, 4, 5, 6, 7, 8] → ids  [1, 2, 3, 4, 5, 6]
//                              mask [1, 1, 1, 1, 1, 1]
//
// Reference: Rust Book §10 (Traits), §17 (Trait Objects)

use std::sync::Arc;

use crate::data::preprocessor::{INPUT_ID_NAME, INPUT_MASK_NAME};
use crate::data::raw_batch::{UTTERANCE_IDS_NAME, UTTERANCE_NAME};
use crate::domain::dialog::{TokenizedTurn, TurnInput};
use crate::domain::error::PreprocessError;
use crate::domain::traits::{SubwordModel, TokenizationStrategy};

/// Pad id written beyond a turn's natural length
pub const PAD_ID: u32 = 0;

// ─── IndexTokenizer ───────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct IndexTokenizer {
    seq_length: usize,
}

impl IndexTokenizer {
    pub fn new(seq_length: usize) -> Result<Self, PreprocessError> {
        if seq_length == 0 {
            return Err(PreprocessError::config("seq_length", "must be positive"));
        }
        Ok(Self { seq_length })
    }
}

impl TokenizationStrategy for IndexTokenizer {
    fn name(&self) -> &'static str {
        "index"
    }

    fn input_field(&self) -> &'static str {
        UTTERANCE_IDS_NAME
    }

    fn seq_length(&self) -> usize {
        self.seq_length
    }

    fn tokenize(&self, input: TurnInput<'_>) -> Result<TokenizedTurn, PreprocessError> {
        match input {
            TurnInput::Ids(ids) => Ok(TokenizedTurn::padded(ids, self.seq_length, PAD_ID)),
            other => Err(PreprocessError::FieldKind {
                field: UTTERANCE_IDS_NAME.to_string(),
                expected: "token ids",
                actual: other.kind(),
            }),
        }
    }

    fn empty_turn(&self) -> TokenizedTurn {
        TokenizedTurn::empty(self.seq_length, PAD_ID)
    }
}

// ─── SubwordTokenizer ─────────────────────────────────────────────────────────
/// Adapter over an external subword model. The sequence length is
/// whatever the model handle was built with.
#[derive(Debug, Clone)]
pub struct SubwordTokenizer {
    model: Arc<dyn SubwordModel>,
    seq_length: usize,
}

impl SubwordTokenizer {
    pub fn new(model: Arc<dyn SubwordModel>) -> Result<Self, PreprocessError> {
        let seq_length = model.max_seq_length();
        if seq_length == 0 {
            return Err(PreprocessError::config("max_seq_length", "must be positive"));
        }
        Ok(Self { model, seq_length })
    }
}

impl TokenizationStrategy for SubwordTokenizer {
    fn name(&self) -> &'static str {
        "subword"
    }

    fn input_field(&self) -> &'static str {
        UTTERANCE_NAME
    }

    fn seq_length(&self) -> usize {
        self.seq_length
    }

    fn tokenize(&self, input: TurnInput<'_>) -> Result<TokenizedTurn, PreprocessError> {
        let text = match input {
            TurnInput::Text(text) => text,
            other => {
                return Err(PreprocessError::FieldKind {
                    field: UTTERANCE_NAME.to_string(),
                    expected: "text",
                    actual: other.kind(),
                })
            }
        };

        // coordinate is filled in by the caller, which knows (i, j)
        let turn = self.model.encode(text).map_err(|e| PreprocessError::Tokenizer {
            dialog: 0,
            turn: 0,
            reason: format!("{e:#}"),
        })?;

        for (field, len) in [(INPUT_ID_NAME, turn.ids.len()), (INPUT_MASK_NAME, turn.mask.len())] {
            if len != self.seq_length {
                return Err(PreprocessError::ShapeMismatch {
                    field: field.to_string(),
                    expected: vec![self.seq_length],
                    actual: vec![len],
                });
            }
        }
        Ok(turn)
    }
}
