// ============================================================
// Layer 6 — Tokenizer Store and BERT Preprocessor
// ============================================================
// TokenizerStore builds (or reloads) a BERT-style word-level
// vocabulary over the dialogue corpus:
//
//   [PAD]=0  [UNK]=1  [CLS]=101  [SEP]=102  [MASK]=103
//   corpus words from 104 upwards, most frequent first
//
// The tokenizer JSON is written by hand in HuggingFace format
// and loaded with Tokenizer::from_str / from_file, which avoids
// the trainer ModelWrapper mismatch in tokenizers 0.15.
// A BertProcessing post-processor frames every encoding as
// [CLS] ... [SEP].
//
// BertPreprocessor fixes truncation and padding to
// max_seq_length once, at construction, so every encode() is
// exactly max_seq_length long. It is the SubwordModel behind
// the subword tokenisation strategy.
//
// Reference: Devlin et al. (2019) BERT
//            tokenizers crate documentation

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tokenizers::{PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::domain::dialog::TokenizedTurn;
use crate::domain::traits::SubwordModel;

pub const PAD_TOKEN: (&str, u32) = ("[PAD]", 0);
pub const UNK_TOKEN: (&str, u32) = ("[UNK]", 1);
pub const CLS_TOKEN: (&str, u32) = ("[CLS]", 101);
pub const SEP_TOKEN: (&str, u32) = ("[SEP]", 102);
pub const MASK_TOKEN: (&str, u32) = ("[MASK]", 103);

const SPECIAL_TOKENS: [(&str, u32); 5] = [PAD_TOKEN, UNK_TOKEN, CLS_TOKEN, SEP_TOKEN, MASK_TOKEN];
const FIRST_WORD_ID: u32 = 104;

const TOKENIZER_FILE: &str = "tokenizer.json";

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load existing tokenizer or build a new one from texts
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        let tok_path = self.dir.join(TOKENIZER_FILE);
        if tok_path.exists() {
            tracing::info!("Loading existing tokenizer from '{}'", tok_path.display());
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join(TOKENIZER_FILE);
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
    }

    /// Build the tokenizer, write it to `<dir>/tokenizer.json` and
    /// return the loaded instance.
    pub fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let json = tokenizer_json(texts, vocab_size);
        let tok_path = self.dir.join(TOKENIZER_FILE);
        std::fs::write(&tok_path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("Cannot write tokenizer JSON to '{}'", tok_path.display()))?;

        tracing::info!("Tokenizer saved to '{}'", tok_path.display());
        self.load()
    }
}

/// Build a tokenizer in memory without touching disk.
pub fn build_tokenizer(texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
    let json = tokenizer_json(texts, vocab_size);
    Tokenizer::from_str(&json.to_string()).map_err(|e| anyhow!("Cannot build tokenizer: {e}"))
}

/// Most frequent corpus words, at most `vocab_size` minus the
/// special tokens. Ties break alphabetically so the ids are stable.
fn top_words(texts: &[String], vocab_size: usize) -> Vec<String> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in text.split_whitespace() {
            let w = word.to_lowercase();
            let w = w.trim_matches(|c: char| !c.is_alphanumeric());
            if !w.is_empty() {
                *freq.entry(w.to_string()).or_insert(0) += 1;
            }
        }
    }

    let mut words: Vec<(String, usize)> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(vocab_size.saturating_sub(SPECIAL_TOKENS.len()));
    words.into_iter().map(|(w, _)| w).collect()
}

fn tokenizer_json(texts: &[String], vocab_size: usize) -> serde_json::Value {
    let mut vocab = serde_json::Map::new();
    for (token, id) in SPECIAL_TOKENS {
        vocab.insert(token.to_string(), serde_json::json!(id));
    }
    let mut next_id = FIRST_WORD_ID;
    for word in top_words(texts, vocab_size) {
        if !vocab.contains_key(&word) {
            vocab.insert(word, serde_json::json!(next_id));
            next_id += 1;
        }
    }
    tracing::debug!("Vocabulary has {} entries", vocab.len());

    let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
        .iter()
        .map(|(token, id)| {
            serde_json::json!({
                "id": id, "content": token, "single_word": false, "lstrip": false,
                "rstrip": false, "normalized": false, "special": true
            })
        })
        .collect();

    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": {
            "type": "Whitespace"
        },
        "post_processor": {
            "type": "BertProcessing",
            "sep": [SEP_TOKEN.0, SEP_TOKEN.1],
            "cls": [CLS_TOKEN.0, CLS_TOKEN.1]
        },
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": UNK_TOKEN.0
        }
    })
}

// ─── BertPreprocessor ─────────────────────────────────────────────────────────
/// Text → fixed-length (ids, mask) using a `tokenizers::Tokenizer`.
pub struct BertPreprocessor {
    tokenizer: Tokenizer,
    max_seq_length: usize,
}

impl BertPreprocessor {
    pub fn new(mut tokenizer: Tokenizer, max_seq_length: usize) -> Result<Self> {
        if max_seq_length <= 2 {
            anyhow::bail!("max_seq_length must leave room for [CLS], [SEP] and one token, got {max_seq_length}");
        }

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_seq_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Cannot configure truncation: {e}"))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_seq_length),
            direction: PaddingDirection::Right,
            pad_id: PAD_TOKEN.1,
            pad_token: PAD_TOKEN.0.to_string(),
            ..Default::default()
        }));

        Ok(Self { tokenizer, max_seq_length })
    }
}

impl fmt::Debug for BertPreprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BertPreprocessor")
            .field("vocab_size", &self.tokenizer.get_vocab_size(true))
            .field("max_seq_length", &self.max_seq_length)
            .finish()
    }
}

impl SubwordModel for BertPreprocessor {
    fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }

    fn encode(&self, text: &str) -> Result<TokenizedTurn> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenisation error: {e}"))?;
        Ok(TokenizedTurn {
            ids: enc.get_ids().to_vec(),
            mask: enc.get_attention_mask().to_vec(),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "I need a taxi to the station".to_string(),
            "a table for two please".to_string(),
            "the taxi is booked".to_string(),
        ]
    }

    #[test]
    fn test_top_words_by_frequency_then_alphabet() {
        let words = top_words(&corpus(), 8);
        // "a", "taxi", "the" appear twice; capacity is 8 - 5 = 3
        assert_eq!(words, vec!["a", "taxi", "the"]);
    }

    #[test]
    fn test_encoding_is_framed_and_padded() {
        let tok = build_tokenizer(&corpus(), 100).unwrap();
        let bert = BertPreprocessor::new(tok, 8).unwrap();
        let out = bert.encode("Taxi please").unwrap();

        assert_eq!(out.ids.len(), 8);
        assert_eq!(out.ids[0], CLS_TOKEN.1);
        assert_eq!(out.ids[3], SEP_TOKEN.1);
        assert_eq!(&out.ids[4..], &[PAD_TOKEN.1; 4]);
        assert_eq!(out.mask, vec![1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_long_text_is_truncated_to_length() {
        let tok = build_tokenizer(&corpus(), 100).unwrap();
        let bert = BertPreprocessor::new(tok, 5).unwrap();
        let out = bert.encode("i need a taxi to the station please").unwrap();
        assert_eq!(out.ids.len(), 5);
        assert_eq!(out.mask, vec![1; 5]);
        assert_eq!(out.ids[0], CLS_TOKEN.1);
        assert_eq!(out.ids[4], SEP_TOKEN.1);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let tok = build_tokenizer(&corpus(), 100).unwrap();
        let bert = BertPreprocessor::new(tok, 4).unwrap();
        let out = bert.encode("zebra").unwrap();
        assert_eq!(out.ids, vec![CLS_TOKEN.1, UNK_TOKEN.1, SEP_TOKEN.1, PAD_TOKEN.1]);
    }

    #[test]
    fn test_store_saves_then_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().to_string_lossy());
        let built = store.load_or_build(&corpus(), 100).unwrap();
        assert!(dir.path().join(TOKENIZER_FILE).exists());

        let reloaded = store.load_or_build(&[], 100).unwrap();
        assert_eq!(built.get_vocab_size(true), reloaded.get_vocab_size(true));
    }

    #[test]
    fn test_rejects_tiny_max_seq_length() {
        let tok = build_tokenizer(&corpus(), 100).unwrap();
        assert!(BertPreprocessor::new(tok, 1).is_err());
    }
}
