// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Two subcommands: `prepare` and `build-vocab`.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::prepare_use_case::{PrepareConfig, StrategyKind};
use crate::data::preprocessor::PreprocessorConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn a dialogue file into VRNN batches and report per-batch statistics
    Prepare(PrepareArgs),

    /// Build the BERT-style word-level tokenizer for a dialogue file
    BuildVocab(BuildVocabArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StrategyArg {
    /// Pre-tokenised `token_ids` padded to max-seq-length
    Index,
    /// Utterance text through the subword tokenizer
    Subword,
}

impl From<StrategyArg> for StrategyKind {
    fn from(a: StrategyArg) -> Self {
        match a {
            StrategyArg::Index => StrategyKind::Index,
            StrategyArg::Subword => StrategyKind::Subword,
        }
    }
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Dialogue file (.json array or .jsonl)
    #[arg(long)]
    pub dialogs: String,

    /// Where stats, config and the tokenizer are written
    #[arg(long, default_value = "prepared")]
    pub output_dir: String,

    #[arg(long, value_enum, default_value_t = StrategyArg::Index)]
    pub strategy: StrategyArg,

    /// Number of latent discourse states
    #[arg(long, allow_negative_numbers = true)]
    pub num_states: i64,

    /// Turns per dialogue after padding/truncation
    #[arg(long)]
    pub max_dialog_length: usize,

    /// Tokens per turn after padding/truncation
    #[arg(long)]
    pub max_seq_length: usize,

    /// Supervised turn as DIALOG:TURN, repeatable. Without any,
    /// every real turn is labeled.
    #[arg(long = "labeled-turn", value_parser = parse_turn_id)]
    pub labeled_turns: Vec<(usize, usize)>,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    /// Vocabulary size when a tokenizer has to be built
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,
}

impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        let mut preprocessor = PreprocessorConfig::new(a.num_states, a.max_dialog_length, a.max_seq_length);
        if !a.labeled_turns.is_empty() {
            preprocessor = preprocessor.with_labeled_dialog_turn_ids(a.labeled_turns);
        }
        PrepareConfig {
            dialogs_path: a.dialogs,
            output_dir:   a.output_dir,
            strategy:     a.strategy.into(),
            batch_size:   a.batch_size,
            num_workers:  a.num_workers,
            vocab_size:   a.vocab_size,
            preprocessor,
        }
    }
}

#[derive(Args, Debug)]
pub struct BuildVocabArgs {
    /// Dialogue file (.json array or .jsonl)
    #[arg(long)]
    pub dialogs: String,

    /// Directory to write tokenizer.json into
    #[arg(long, default_value = "prepared")]
    pub output_dir: String,

    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,
}

/// Parse `DIALOG:TURN` into a supervision coordinate.
fn parse_turn_id(s: &str) -> Result<(usize, usize), String> {
    let (dialog, turn) = s
        .split_once(':')
        .ok_or_else(|| format!("expected DIALOG:TURN, got '{s}'"))?;
    let dialog = dialog.trim().parse().map_err(|e| format!("bad dialogue index '{dialog}': {e}"))?;
    let turn = turn.trim().parse().map_err(|e| format!("bad turn index '{turn}': {e}"))?;
    Ok((dialog, turn))
}
