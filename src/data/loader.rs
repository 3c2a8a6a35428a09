// ============================================================
// Layer 4 — Dialogue Loader
// ============================================================
// Loads DialogRecords from disk with serde_json.
//
// Two layouts are accepted, chosen by file extension:
//   .jsonl  one record per line (blank lines skipped)
//   other   a single JSON array of records
//
// A record looks like:
//   {"dialog_index": 0,
//    "turns": [{"utterance": "i need a taxi",
//               "token_ids": [57, 912, 4, 3301],
//               "label": 3, "domain": 1}, ...]}
//
// Missing turn fields default (empty text / ids, label 0),
// so a text-only corpus still loads for the subword path.
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::dialog::DialogRecord;
use crate::domain::traits::DialogSource;

/// Loads every dialogue from one JSON / JSON-lines file.
/// Implements the DialogSource trait from Layer 3.
pub struct JsonDialogLoader {
    path: String,
}

impl JsonDialogLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl DialogSource for JsonDialogLoader {
    fn load_all(&self) -> Result<Vec<DialogRecord>> {
        let path = Path::new(&self.path);
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Cannot read dialogues from '{}'", self.path))?;

        let records = if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
            parse_json_lines(&raw, &self.path)?
        } else {
            serde_json::from_str::<Vec<DialogRecord>>(&raw)
                .with_context(|| format!("'{}' is not a JSON array of dialogues", self.path))?
        };

        let empty = records.iter().filter(|r| r.turns.is_empty()).count();
        if empty > 0 {
            tracing::warn!("{} dialogues in '{}' have no turns", empty, self.path);
        }

        tracing::info!("Loaded {} dialogues from '{}'", records.len(), self.path);
        Ok(records)
    }
}

fn parse_json_lines(raw: &str, source: &str) -> Result<Vec<DialogRecord>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<DialogRecord>(line)
                .with_context(|| format!("Bad dialogue on line {} of '{}'", n + 1, source))
        })
        .collect()
}
