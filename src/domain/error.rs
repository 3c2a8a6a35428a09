// ============================================================
// Layer 3 — Preprocessing Error Taxonomy
// ============================================================
// Three families of failure, all programmer/config errors:
//
//   Config            — invalid construction-time values
//                       (num_states <= 0, zero lengths, ...)
//   ContractViolation — a batch or tokenizer output that does
//                       not match the declared layout
//   Range             — a supervision coordinate outside the
//                       declared maximum dialogue length
//
// Nothing here is retried or coerced; callers surface the
// message and stop.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)

use thiserror::Error;

/// Coarse grouping used by callers that only care about the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    ContractViolation,
    Range,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessError {
    #[error("configuration error: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("batch is missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' holds {actual}, expected {expected}")]
    FieldKind {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("shape mismatch in '{field}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        field: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("subword model failed on turn ({dialog}, {turn}): {reason}")]
    Tokenizer {
        dialog: usize,
        turn: usize,
        reason: String,
    },

    #[error(
        "supervision coordinate ({dialog}, {turn}) is out of range: \
         turn index must be below max dialogue length {max_dialog_length}"
    )]
    CoordinateOutOfRange {
        dialog: usize,
        turn: usize,
        max_dialog_length: usize,
    },
}

impl PreprocessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PreprocessError::InvalidConfig { .. } => ErrorKind::Config,
            PreprocessError::CoordinateOutOfRange { .. } => ErrorKind::Range,
            PreprocessError::MissingField { .. }
            | PreprocessError::FieldKind { .. }
            | PreprocessError::ShapeMismatch { .. }
            | PreprocessError::Tokenizer { .. } => ErrorKind::ContractViolation,
        }
    }

    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        PreprocessError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Attach the batch coordinate to a tokenizer failure.
    pub(crate) fn at_turn(self, dialog: usize, turn: usize) -> Self {
        match self {
            PreprocessError::Tokenizer { reason, .. } => PreprocessError::Tokenizer { dialog, turn, reason },
            other => other,
        }
    }
}
