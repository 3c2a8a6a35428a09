// ============================================================
// Layer 4 — VRNN Batcher
// ============================================================
// Implements Burn's Batcher trait so the preprocessor runs as
// the per-batch mapping stage of Burn's DataLoader:
//
//   Vec<DialogRecord>
//       │  RawDialogBatch::from_records (pad / truncate turns)
//       ▼
//   RawDialogBatch
//       │  DataPreprocessor::create_feature_and_label
//       ▼
//   VrnnFeatures<B>
//
// Batcher::batch cannot fail, so the batch item is a Result and
// errors reach whoever iterates the loader.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::preprocessor::{DataPreprocessor, VrnnFeatures};
use crate::data::raw_batch::RawDialogBatch;
use crate::domain::dialog::DialogRecord;
use crate::domain::error::PreprocessError;

pub type FeatureBatch<B> = Result<VrnnFeatures<B>, PreprocessError>;

#[derive(Clone, Debug)]
pub struct VrnnBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
    preprocessor: DataPreprocessor,
}

impl<B: Backend> VrnnBatcher<B> {
    pub fn new(preprocessor: DataPreprocessor, device: B::Device) -> Self {
        Self { device, preprocessor }
    }
}

impl<B: Backend> Batcher<DialogRecord, FeatureBatch<B>> for VrnnBatcher<B> {
    fn batch(&self, items: Vec<DialogRecord>) -> FeatureBatch<B> {
        let raw = RawDialogBatch::from_records(&items, self.preprocessor.dialog_length())?;
        self.preprocessor.create_feature_and_label(&raw, &self.device)
    }
}
