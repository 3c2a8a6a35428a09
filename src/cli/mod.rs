// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BuildVocabArgs, Commands, PrepareArgs};

#[derive(Parser, Debug)]
#[command(
    name = "vrnn-prep",
    version,
    about = "Shape dialogue data into current/next-turn tensors, label masks and latent-state priors for a VRNN."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args)    => run_prepare(args),
            Commands::BuildVocab(args) => run_build_vocab(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    tracing::info!("Preparing dialogues from: {}", args.dialogs);
    let summary = PrepareUseCase::new(args.into()).execute()?;

    println!(
        "Prepared {} dialogues in {} batches ({} valid turns, {} labeled).",
        summary.dialogues, summary.batches, summary.valid_turns, summary.labeled_turns
    );
    Ok(())
}

fn run_build_vocab(args: BuildVocabArgs) -> Result<()> {
    use crate::data::loader::JsonDialogLoader;
    use crate::domain::traits::DialogSource;
    use crate::infra::tokenizer_store::TokenizerStore;

    let records = JsonDialogLoader::new(&args.dialogs).load_all()?;
    let texts: Vec<String> = records
        .into_iter()
        .flat_map(|r| r.turns.into_iter().map(|t| t.utterance))
        .collect();

    let tokenizer = TokenizerStore::new(&args.output_dir).build_and_save(&texts, args.vocab_size)?;
    println!(
        "Tokenizer with {} entries written to {}/tokenizer.json",
        tokenizer.get_vocab_size(true),
        args.output_dir
    );
    Ok(())
}
