// ============================================================
// Layer 3 — Dialogue Domain Types
// ============================================================
// A dialogue is an ordered list of turns. Each turn carries
// the same utterance in two forms so either tokenisation
// backend can consume it:
//   - utterance: raw text for the subword (BERT) path
//   - token_ids: pre-tokenised vocabulary ids for the index path
//
// Plus two per-turn annotations:
//   - label:  dialogue-act / type label the VRNN is supervised on
//   - domain: domain annotation, passed through untouched
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// One utterance within a dialogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogTurn {
    /// Raw utterance text
    #[serde(default)]
    pub utterance: String,

    /// Pre-tokenised vocabulary ids (natural length, unpadded)
    #[serde(default)]
    pub token_ids: Vec<u32>,

    /// Per-turn type label
    #[serde(default)]
    pub label: i64,

    /// Per-turn domain label
    #[serde(default)]
    pub domain: i64,
}

impl DialogTurn {
    pub fn new(utterance: impl Into<String>, token_ids: Vec<u32>, label: i64, domain: i64) -> Self {
        Self {
            utterance: utterance.into(),
            token_ids,
            label,
            domain,
        }
    }
}

/// A whole dialogue as produced by a `DialogSource`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogRecord {
    /// Dataset-wide dialogue id. Together with the turn position
    /// it forms the (dialogue_index, turn_index) identifier pair.
    pub dialog_index: usize,

    /// Turns in conversation order
    pub turns: Vec<DialogTurn>,
}

impl DialogRecord {
    pub fn new(dialog_index: usize, turns: Vec<DialogTurn>) -> Self {
        Self { dialog_index, turns }
    }

    /// Number of real (non-padding) turns
    pub fn num_turns(&self) -> usize {
        self.turns.len()
    }
}

/// Borrowed view of one turn's content, in whichever form the
/// batch field holds it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnInput<'a> {
    Ids(&'a [u32]),
    Text(&'a str),
}

impl TurnInput<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            TurnInput::Ids(_) => "token ids",
            TurnInput::Text(_) => "text",
        }
    }
}

/// Fixed-length output of a tokenisation strategy for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedTurn {
    pub ids: Vec<u32>,
    /// 1 for real tokens, 0 for padding
    pub mask: Vec<u32>,
}

impl TokenizedTurn {
    /// All-padding turn of the given length.
    pub fn empty(seq_length: usize, pad_id: u32) -> Self {
        Self {
            ids: vec![pad_id; seq_length],
            mask: vec![0; seq_length],
        }
    }

    /// Pad `ids` with `pad_id` up to `seq_length`, keeping only the
    /// first `seq_length` tokens when the sequence is longer.
    pub fn padded(ids: &[u32], seq_length: usize, pad_id: u32) -> Self {
        let mut turn = Self::empty(seq_length, pad_id);
        let len = ids.len().min(seq_length);
        turn.ids[..len].copy_from_slice(&ids[..len]);
        turn.mask[..len].fill(1);
        turn
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of real tokens
    pub fn num_tokens(&self) -> usize {
        self.mask.iter().filter(|&&m| m != 0).count()
    }
}
