// Shared test fixtures for the data layer.

use crate::domain::dialog::{DialogRecord, DialogTurn, TokenizedTurn};
use crate::domain::traits::SubwordModel;

pub type TestBackend = burn::backend::NdArray;

/// Stand-in subword model: [CLS]=101, one id per word (the word's
/// length), [SEP]=102, padded or cut to `emit_length`.
#[derive(Debug)]
pub struct WordLengthModel {
    pub max_seq_length: usize,
    /// Length actually returned, to simulate a misbehaving model
    pub emit_length: usize,
}

impl WordLengthModel {
    pub fn new(max_seq_length: usize) -> Self {
        Self {
            max_seq_length,
            emit_length: max_seq_length,
        }
    }
}

impl SubwordModel for WordLengthModel {
    fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }

    fn encode(&self, text: &str) -> anyhow::Result<TokenizedTurn> {
        if text == "<boom>" {
            anyhow::bail!("model exploded");
        }
        let mut ids = vec![101];
        ids.extend(text.split_whitespace().map(|w| w.len() as u32));
        ids.push(102);
        Ok(TokenizedTurn::padded(&ids, self.emit_length, 0))
    }
}

fn turn(utterance: &str, label: i64, domain: i64) -> DialogTurn {
    // ids derived from the words so both strategies see the same turn
    let token_ids = utterance
        .split_whitespace()
        .map(|w| w.bytes().map(u32::from).sum::<u32>())
        .collect();
    DialogTurn::new(utterance, token_ids, label, domain)
}

/// Two dialogues: dialogue 0 has 4 turns, dialogue 1 has 6 turns
/// (one of them longer than 8 tokens).
pub fn sample_dialogs() -> Vec<DialogRecord> {
    vec![
        DialogRecord::new(
            0,
            vec![
                turn("hello there", 1, 3),
                turn("hi how can i help", 2, 3),
                turn("i need a taxi", 3, 3),
                turn("where to", 4, 3),
            ],
        ),
        DialogRecord::new(
            1,
            vec![
                turn("book a table for two", 1, 2),
                turn("which restaurant", 2, 2),
                turn("the cheap italian place near the main station please", 3, 2),
                turn("what time", 2, 2),
                turn("seven", 4, 2),
                turn("done", 0, 2),
            ],
        ),
    ]
}
