// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Runs the full preprocessing pipeline in order:
//
//   Step 1: Load dialogues             (Layer 4 - data)
//   Step 2: Build tokenisation strategy (Layer 4 / Layer 6)
//   Step 3: Build the preprocessor     (Layer 4 - data)
//   Step 4: Save config                (Layer 2)
//   Step 5: Stream batches through
//           Burn's DataLoader          (Layer 4 - data)
//   Step 6: Log batch statistics       (Layer 6 - infra)
//
// Reference: Burn Book §4 (DataLoader)

use anyhow::{Context, Result};
use burn::data::dataloader::DataLoaderBuilder;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::Arc};

use crate::data::{
    batcher::VrnnBatcher,
    dataset::DialogDataset,
    loader::JsonDialogLoader,
    preprocessor::{DataPreprocessor, PreprocessorConfig},
    tokenization::{IndexTokenizer, SubwordTokenizer},
};
use crate::domain::dialog::DialogRecord;
use crate::domain::traits::{DialogSource, TokenizationStrategy};
use crate::infra::{
    metrics::{BatchStats, StatsLogger},
    tokenizer_store::{BertPreprocessor, TokenizerStore},
};

type PrepBackend = burn::backend::NdArray;

/// Which tokenisation backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Index,
    Subword,
}

// ─── Preparation Configuration ───────────────────────────────────────────────
// Saved next to the outputs so a run can be reproduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    pub dialogs_path: String,
    pub output_dir:   String,
    pub strategy:     StrategyKind,
    pub batch_size:   usize,
    pub num_workers:  usize,
    pub vocab_size:   usize,
    pub preprocessor: PreprocessorConfig,
}

/// Totals over one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrepareSummary {
    pub batches:       usize,
    pub dialogues:     usize,
    pub valid_turns:   usize,
    pub labeled_turns: usize,
}

pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PrepareSummary> {
        let cfg = &self.config;

        // ── Step 1: Load dialogues ───────────────────────────────────────────
        let records = JsonDialogLoader::new(&cfg.dialogs_path).load_all()?;
        let dataset = DialogDataset::new(records.clone());
        if dataset.max_dialog_length() > cfg.preprocessor.max_dialog_length {
            tracing::warn!(
                "Longest dialogue has {} turns; turns beyond {} are dropped",
                dataset.max_dialog_length(),
                cfg.preprocessor.max_dialog_length
            );
        }

        // ── Step 2: Tokenisation strategy ────────────────────────────────────
        let strategy = self.build_strategy(&records)?;

        // ── Step 3: Preprocessor (validates num_states, coordinates, ...) ────
        let preprocessor = DataPreprocessor::new(strategy, cfg.preprocessor.clone())
            .context("Invalid preprocessing configuration")?;

        // ── Step 4: Save config ──────────────────────────────────────────────
        self.save_config()?;

        // ── Step 5: DataLoader ───────────────────────────────────────────────
        let batcher = VrnnBatcher::<PrepBackend>::new(preprocessor, Default::default());
        let loader = DataLoaderBuilder::new(batcher)
            .batch_size(cfg.batch_size)
            .num_workers(cfg.num_workers)
            .build(dataset);

        // ── Step 6: Statistics ───────────────────────────────────────────────
        let logger = StatsLogger::new(&cfg.output_dir)?;
        let mut summary = PrepareSummary::default();

        for (i, batch) in loader.iter().enumerate() {
            let features = batch.with_context(|| format!("Preprocessing batch {i} failed"))?;
            let stats = BatchStats::from_features(i, &features);
            logger.log(&stats)?;

            summary.batches += 1;
            summary.dialogues += stats.batch_size;
            summary.valid_turns += stats.valid_turns;
            summary.labeled_turns += stats.labeled_turns;
        }

        tracing::info!(
            "Preprocessed {} dialogues in {} batches: {} valid turns, {} labeled",
            summary.dialogues,
            summary.batches,
            summary.valid_turns,
            summary.labeled_turns
        );
        tracing::info!("Batch statistics written to '{}'", logger.csv_path().display());
        Ok(summary)
    }

    fn build_strategy(&self, records: &[DialogRecord]) -> Result<Arc<dyn TokenizationStrategy>> {
        let cfg = &self.config;
        let seq_length = cfg.preprocessor.max_seq_length;

        match cfg.strategy {
            StrategyKind::Index => Ok(Arc::new(IndexTokenizer::new(seq_length)?)),
            StrategyKind::Subword => {
                let texts: Vec<String> = records
                    .iter()
                    .flat_map(|r| r.turns.iter().map(|t| t.utterance.clone()))
                    .collect();
                let tokenizer = TokenizerStore::new(&cfg.output_dir).load_or_build(&texts, cfg.vocab_size)?;
                let bert = BertPreprocessor::new(tokenizer, seq_length)?;
                Ok(Arc::new(SubwordTokenizer::new(Arc::new(bert))?))
            }
        }
    }

    fn save_config(&self) -> Result<()> {
        let dir = PathBuf::from(&self.config.output_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;

        let path = dir.join("prepare_config.json");
        fs::write(&path, serde_json::to_string_pretty(&self.config)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved preparation config to '{}'", path.display());
        Ok(())
    }
}
