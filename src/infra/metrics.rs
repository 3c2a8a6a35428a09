// ============================================================
// Layer 6 — Batch Statistics Logger
// ============================================================
// Records one CSV row per preprocessed batch so a run can be
// checked after the fact: how many turns were real, how many
// carried supervision.
//
// Output file: <output_dir>/batch_stats.csv
//
//   batch,batch_size,dialog_length,valid_turns,labeled_turns
//   0,8,13,71,71
//   1,8,13,64,3
//
// With sparse supervision labeled_turns counts only the listed
// coordinates that fell into the batch; without it, it equals
// valid_turns.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use burn::{prelude::*, tensor::ElementConversion};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::data::preprocessor::VrnnFeatures;

/// Summary of one preprocessed batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub batch: usize,
    pub batch_size: usize,
    pub dialog_length: usize,
    /// Turns with at least one real token in input_1. On the subword
    /// path padding turns still carry [CLS] [SEP] and are counted.
    pub valid_turns: usize,
    /// Turns with label_mask == 1
    pub labeled_turns: usize,
}

impl BatchStats {
    pub fn from_features<B: Backend>(batch: usize, features: &VrnnFeatures<B>) -> Self {
        let [batch_size, dialog_length] = features.label_mask.dims();

        let valid_turns = features
            .input_1
            .input_mask
            .clone()
            .max_dim(2)
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;

        let labeled_turns = features
            .label_mask
            .clone()
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;

        Self { batch, batch_size, dialog_length, valid_turns, labeled_turns }
    }
}

/// Appends batch statistics to a CSV file.
pub struct StatsLogger {
    csv_path: PathBuf,
}

impl StatsLogger {
    /// Create the output directory and the CSV with its header.
    /// An existing file is replaced, one file per run.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("batch_stats.csv");
        let mut f = fs::File::create(&csv_path)?;
        writeln!(f, "batch,batch_size,dialog_length,valid_turns,labeled_turns")?;
        tracing::debug!("Created stats CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, s: &BatchStats) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{},{},{},{}",
            s.batch, s.batch_size, s.dialog_length, s.valid_turns, s.labeled_turns,
        )?;

        tracing::debug!(
            "Batch {}: {} valid turns, {} labeled",
            s.batch,
            s.valid_turns,
            s.labeled_turns
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
