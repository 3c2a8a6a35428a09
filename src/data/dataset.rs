use burn::data::dataset::Dataset;

use crate::domain::dialog::DialogRecord;

/// In-memory dialogue dataset served to burn's DataLoader.
pub struct DialogDataset {
    records: Vec<DialogRecord>,
}

impl DialogDataset {
    pub fn new(records: Vec<DialogRecord>) -> Self { Self { records } }

    /// Longest dialogue in turns
    pub fn max_dialog_length(&self) -> usize {
        self.records.iter().map(DialogRecord::num_turns).max().unwrap_or(0)
    }

    /// Longest pre-tokenised turn
    pub fn max_token_length(&self) -> usize {
        self.records
            .iter()
            .flat_map(|r| r.turns.iter())
            .map(|t| t.token_ids.len())
            .max()
            .unwrap_or(0)
    }
}

impl Dataset<DialogRecord> for DialogDataset {
    fn get(&self, index: usize) -> Option<DialogRecord> {
        self.records.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
