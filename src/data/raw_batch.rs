// ============================================================
// Layer 4 — Raw Dialogue Batch
// ============================================================
// The loader-side view of a batch: a mapping from field name
// to a per-turn value, before any tokenisation.
//
// Every field is laid out [batch_size][dialog_length]:
//
//   utterance_ids   TokenIds  [b][t] -> Vec<u32> (natural length)
//   utterance       Text      [b][t] -> String
//   turn_mask       PerTurn   [b][t] -> 1 real turn / 0 padding
//   label           PerTurn   [b][t] -> type label
//   domain_label    PerTurn   [b][t] -> domain label
//   dialog_turn_id  TurnIds   [b][t] -> (dialog_index, turn_index)
//
// `insert` enforces that all fields agree on batch_size and
// dialog_length, so the preprocessor can index any field with
// the same (i, j).
//
// Collation from records:
//   dialogues shorter than dialog_length get empty turns
//   (turn_mask 0, label 0, domain 0); longer ones keep their
//   first dialog_length turns.

use std::collections::BTreeMap;

use crate::domain::dialog::{DialogRecord, TurnInput};
use crate::domain::error::PreprocessError;

pub const UTTERANCE_IDS_NAME: &str = "utterance_ids";
pub const UTTERANCE_NAME: &str = "utterance";
pub const TURN_MASK_NAME: &str = "turn_mask";
pub const LABEL_NAME: &str = "label";
pub const DOMAIN_LABEL_NAME: &str = "domain_label";
pub const DIAL_TURN_ID_NAME: &str = "dialog_turn_id";

/// One stacked field of a raw batch.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    TokenIds(Vec<Vec<Vec<u32>>>),
    Text(Vec<Vec<String>>),
    PerTurn(Vec<Vec<i64>>),
    TurnIds(Vec<Vec<(usize, usize)>>),
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::TokenIds(_) => "token ids",
            FieldValue::Text(_) => "text",
            FieldValue::PerTurn(_) => "per-turn scalars",
            FieldValue::TurnIds(_) => "turn identifiers",
        }
    }

    /// Length of every row.
    fn row_lengths(&self) -> Vec<usize> {
        match self {
            FieldValue::TokenIds(rows) => rows.iter().map(Vec::len).collect(),
            FieldValue::Text(rows) => rows.iter().map(Vec::len).collect(),
            FieldValue::PerTurn(rows) => rows.iter().map(Vec::len).collect(),
            FieldValue::TurnIds(rows) => rows.iter().map(Vec::len).collect(),
        }
    }

    /// Content of turn `j` of dialogue `i`, for content-bearing fields.
    pub fn turn_input(&self, i: usize, j: usize) -> Option<TurnInput<'_>> {
        match self {
            FieldValue::TokenIds(rows) => rows.get(i)?.get(j).map(|ids| TurnInput::Ids(ids)),
            FieldValue::Text(rows) => rows.get(i)?.get(j).map(|s| TurnInput::Text(s)),
            FieldValue::PerTurn(_) | FieldValue::TurnIds(_) => None,
        }
    }
}

/// Raw batch keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDialogBatch {
    fields: BTreeMap<String, FieldValue>,
    /// (batch_size, dialog_length), fixed by the first inserted field
    dims: Option<(usize, usize)>,
}

impl RawDialogBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, checking it against the batch's shape.
    ///
    /// Rows must all have the same length, and that length and the
    /// row count must match every field inserted before.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Result<(), PreprocessError> {
        let name = name.into();
        let rows = value.row_lengths();
        let batch_size = rows.len();
        let dialog_length = rows.first().copied().unwrap_or(0);

        if let Some(bad) = rows.iter().find(|&&len| len != dialog_length) {
            return Err(PreprocessError::ShapeMismatch {
                field: name,
                expected: vec![batch_size, dialog_length],
                actual: vec![batch_size, *bad],
            });
        }

        match self.dims {
            Some((b, d)) if (b, d) != (batch_size, dialog_length) => {
                return Err(PreprocessError::ShapeMismatch {
                    field: name,
                    expected: vec![b, d],
                    actual: vec![batch_size, dialog_length],
                });
            }
            Some(_) => {}
            None => self.dims = Some((batch_size, dialog_length)),
        }

        self.fields.insert(name, value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let removed = self.fields.remove(name);
        if self.fields.is_empty() {
            self.dims = None;
        }
        removed
    }

    pub fn batch_size(&self) -> usize {
        self.dims.map(|(b, _)| b).unwrap_or(0)
    }

    pub fn dialog_length(&self) -> usize {
        self.dims.map(|(_, d)| d).unwrap_or(0)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Result<&FieldValue, PreprocessError> {
        self.fields
            .get(name)
            .ok_or_else(|| PreprocessError::MissingField { field: name.to_string() })
    }

    pub fn per_turn(&self, name: &str) -> Result<&[Vec<i64>], PreprocessError> {
        match self.field(name)? {
            FieldValue::PerTurn(rows) => Ok(rows),
            other => Err(wrong_kind(name, "per-turn scalars", other)),
        }
    }

    pub fn turn_ids(&self, name: &str) -> Result<&[Vec<(usize, usize)>], PreprocessError> {
        match self.field(name)? {
            FieldValue::TurnIds(rows) => Ok(rows),
            other => Err(wrong_kind(name, "turn identifiers", other)),
        }
    }

    /// Stack dialogue records into a raw batch with every field of
    /// shape [records.len()][dialog_length].
    pub fn from_records(records: &[DialogRecord], dialog_length: usize) -> Result<Self, PreprocessError> {
        let mut ids = Vec::with_capacity(records.len());
        let mut text = Vec::with_capacity(records.len());
        let mut turn_mask = Vec::with_capacity(records.len());
        let mut label = Vec::with_capacity(records.len());
        let mut domain = Vec::with_capacity(records.len());
        let mut turn_ids = Vec::with_capacity(records.len());

        for rec in records {
            if rec.turns.len() > dialog_length {
                tracing::debug!(
                    "Dialogue {} has {} turns, keeping the first {}",
                    rec.dialog_index,
                    rec.turns.len(),
                    dialog_length
                );
            }

            let mut ids_row = Vec::with_capacity(dialog_length);
            let mut text_row = Vec::with_capacity(dialog_length);
            let mut mask_row = Vec::with_capacity(dialog_length);
            let mut label_row = Vec::with_capacity(dialog_length);
            let mut domain_row = Vec::with_capacity(dialog_length);
            let mut id_row = Vec::with_capacity(dialog_length);

            for j in 0..dialog_length {
                match rec.turns.get(j) {
                    Some(turn) => {
                        ids_row.push(turn.token_ids.clone());
                        text_row.push(turn.utterance.clone());
                        mask_row.push(1);
                        label_row.push(turn.label);
                        domain_row.push(turn.domain);
                    }
                    None => {
                        ids_row.push(Vec::new());
                        text_row.push(String::new());
                        mask_row.push(0);
                        label_row.push(0);
                        domain_row.push(0);
                    }
                }
                id_row.push((rec.dialog_index, j));
            }

            ids.push(ids_row);
            text.push(text_row);
            turn_mask.push(mask_row);
            label.push(label_row);
            domain.push(domain_row);
            turn_ids.push(id_row);
        }

        let mut batch = Self::new();
        batch.insert(UTTERANCE_IDS_NAME, FieldValue::TokenIds(ids))?;
        batch.insert(UTTERANCE_NAME, FieldValue::Text(text))?;
        batch.insert(TURN_MASK_NAME, FieldValue::PerTurn(turn_mask))?;
        batch.insert(LABEL_NAME, FieldValue::PerTurn(label))?;
        batch.insert(DOMAIN_LABEL_NAME, FieldValue::PerTurn(domain))?;
        batch.insert(DIAL_TURN_ID_NAME, FieldValue::TurnIds(turn_ids))?;
        Ok(batch)
    }
}

fn wrong_kind(name: &str, expected: &'static str, actual: &FieldValue) -> PreprocessError {
    PreprocessError::FieldKind {
        field: name.to_string(),
        expected,
        actual: actual.kind(),
    }
}
