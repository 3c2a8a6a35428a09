// ============================================================
// Layer 4 — VRNN Data Preprocessor
// ============================================================
// Turns one raw dialogue batch into the seven tensors the VRNN
// consumes:
//
//   (input_1, input_2, label, label_mask,
//    initial_state, initial_sample, domain_label)
//
// Shapes (b = batch_size, d = dialog_length, s = seq_length,
//         n = num_states):
//
//   input_1 / input_2   { input_word_ids, input_mask }  [b, d, s]
//   label / label_mask / domain_label                   [b, d]
//   initial_state / initial_sample                      [b, n]
//
// Windowing:
//   input_1[t] = turn t
//   input_2[t] = turn t+1, and the last position is an empty
//                turn (pad ids, zero mask). Each dialogue is
//                shifted on its own, nothing leaks across rows.
//
//   turns:    T0  T1  T2  T3
//   input_1:  T0  T1  T2  T3
//   input_2:  T1  T2  T3  ∅
//
// Label mask:
//   with labeled_dialog_turn_ids → 1 where the turn's
//       (dialogue_index, turn_index) is in the set, else 0
//   without                      → the batch's turn_mask
//
// Every turn is tokenised once; both views index the same
// tokenised turns.
//
// Reference: Chung et al. (2015) A Recurrent Latent Variable
//            Model for Sequential Data
//            Burn Book §3 (Tensors)

use std::collections::HashSet;
use std::sync::Arc;

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::raw_batch::{
    FieldValue, RawDialogBatch, DIAL_TURN_ID_NAME, DOMAIN_LABEL_NAME, LABEL_NAME, TURN_MASK_NAME,
};
use crate::domain::dialog::TokenizedTurn;
use crate::domain::error::PreprocessError;
use crate::domain::traits::TokenizationStrategy;

/// Key of the token id tensor inside `input_1` / `input_2`
pub const INPUT_ID_NAME: &str = "input_word_ids";
/// Key of the token mask tensor inside `input_1` / `input_2`
pub const INPUT_MASK_NAME: &str = "input_mask";

// ─── Configuration ────────────────────────────────────────────────────────────
/// Construction-time configuration. The dataset metadata
/// (maximum dialogue and sequence length) is passed in here
/// explicitly rather than looked up by dataset name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    /// Cardinality of the latent discourse state; signed so that
    /// bad values from JSON or the CLI reach validation
    pub num_states: i64,
    pub max_dialog_length: usize,
    pub max_seq_length: usize,
    /// Sparse supervision as (dialogue_index, turn_index) pairs
    #[serde(default)]
    pub labeled_dialog_turn_ids: Option<Vec<(usize, usize)>>,
}

impl PreprocessorConfig {
    pub fn new(num_states: i64, max_dialog_length: usize, max_seq_length: usize) -> Self {
        Self {
            num_states,
            max_dialog_length,
            max_seq_length,
            labeled_dialog_turn_ids: None,
        }
    }

    pub fn with_labeled_dialog_turn_ids(mut self, ids: Vec<(usize, usize)>) -> Self {
        self.labeled_dialog_turn_ids = Some(ids);
        self
    }
}

// ─── Output ───────────────────────────────────────────────────────────────────
/// One tokenised view of the dialogue turns.
#[derive(Debug, Clone)]
pub struct TokenizedInput<B: Backend> {
    /// [batch_size, dialog_length, seq_length]
    pub input_word_ids: Tensor<B, 3, Int>,
    /// [batch_size, dialog_length, seq_length], 1 = real token
    pub input_mask: Tensor<B, 3, Int>,
}

impl<B: Backend> TokenizedInput<B> {
    /// Look a tensor up by its stable key.
    pub fn get(&self, key: &str) -> Option<&Tensor<B, 3, Int>> {
        match key {
            INPUT_ID_NAME => Some(&self.input_word_ids),
            INPUT_MASK_NAME => Some(&self.input_mask),
            _ => None,
        }
    }
}

/// Everything the VRNN needs for one batch.
#[derive(Debug, Clone)]
pub struct VrnnFeatures<B: Backend> {
    pub input_1: TokenizedInput<B>,
    pub input_2: TokenizedInput<B>,
    pub label: Tensor<B, 2, Int>,
    pub label_mask: Tensor<B, 2, Int>,
    pub initial_state: Tensor<B, 2>,
    pub initial_sample: Tensor<B, 2>,
    pub domain_label: Tensor<B, 2, Int>,
}

/// The seven outputs in model order.
pub type FeatureTuple<B> = (
    TokenizedInput<B>,
    TokenizedInput<B>,
    Tensor<B, 2, Int>,
    Tensor<B, 2, Int>,
    Tensor<B, 2>,
    Tensor<B, 2>,
    Tensor<B, 2, Int>,
);

impl<B: Backend> VrnnFeatures<B> {
    pub fn into_tuple(self) -> FeatureTuple<B> {
        (
            self.input_1,
            self.input_2,
            self.label,
            self.label_mask,
            self.initial_state,
            self.initial_sample,
            self.domain_label,
        )
    }
}

// ─── DataPreprocessor ─────────────────────────────────────────────────────────
/// Immutable after construction and cheap to clone, so one instance
/// can be handed to every data loader worker.
#[derive(Debug, Clone)]
pub struct DataPreprocessor {
    strategy: Arc<dyn TokenizationStrategy>,
    num_states: usize,
    dialog_length: usize,
    seq_length: usize,
    labeled_dialog_turn_ids: Option<Arc<HashSet<(usize, usize)>>>,
}

impl DataPreprocessor {
    /// Validate the configuration and build the preprocessor.
    ///
    /// Fails with a configuration error for a non-positive
    /// `num_states`, zero lengths, or a strategy whose sequence
    /// length disagrees with `max_seq_length`; and with a range
    /// error for a supervision coordinate whose turn index is not
    /// below `max_dialog_length`.
    pub fn new(
        strategy: Arc<dyn TokenizationStrategy>,
        config: PreprocessorConfig,
    ) -> Result<Self, PreprocessError> {
        let num_states = usize::try_from(config.num_states)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                PreprocessError::config(
                    "num_states",
                    format!("must be a positive integer, got {}", config.num_states),
                )
            })?;

        if config.max_dialog_length == 0 {
            return Err(PreprocessError::config("max_dialog_length", "must be positive"));
        }
        if config.max_seq_length == 0 {
            return Err(PreprocessError::config("max_seq_length", "must be positive"));
        }
        if strategy.seq_length() != config.max_seq_length {
            return Err(PreprocessError::config(
                "max_seq_length",
                format!(
                    "is {} but the {} tokenizer produces sequences of length {}",
                    config.max_seq_length,
                    strategy.name(),
                    strategy.seq_length()
                ),
            ));
        }

        let labeled_dialog_turn_ids = match config.labeled_dialog_turn_ids {
            Some(ids) => {
                if let Some(&(dialog, turn)) = ids.iter().find(|(_, t)| *t >= config.max_dialog_length) {
                    return Err(PreprocessError::CoordinateOutOfRange {
                        dialog,
                        turn,
                        max_dialog_length: config.max_dialog_length,
                    });
                }
                Some(Arc::new(ids.into_iter().collect::<HashSet<_>>()))
            }
            None => None,
        };

        tracing::info!(
            "Preprocessor ready: {} tokenizer, num_states={}, dialog_length={}, seq_length={}, {}",
            strategy.name(),
            num_states,
            config.max_dialog_length,
            config.max_seq_length,
            match &labeled_dialog_turn_ids {
                Some(ids) => format!("{} labeled turns", ids.len()),
                None => "labels follow turn_mask".to_string(),
            }
        );

        Ok(Self {
            strategy,
            num_states,
            dialog_length: config.max_dialog_length,
            seq_length: config.max_seq_length,
            labeled_dialog_turn_ids,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn dialog_length(&self) -> usize {
        self.dialog_length
    }

    pub fn seq_length(&self) -> usize {
        self.seq_length
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Build the seven model inputs for one raw batch.
    pub fn create_feature_and_label<B: Backend>(
        &self,
        batch: &RawDialogBatch,
        device: &B::Device,
    ) -> Result<VrnnFeatures<B>, PreprocessError> {
        let batch_size = batch.batch_size();
        let dialog_length = batch.dialog_length();
        if dialog_length != self.dialog_length {
            return Err(PreprocessError::ShapeMismatch {
                field: "batch".to_string(),
                expected: vec![batch_size, self.dialog_length],
                actual: vec![batch_size, dialog_length],
            });
        }

        let turns = self.tokenize_turns(batch)?;
        let input_1 = self.stack_view(&turns, 0, device);
        let input_2 = self.stack_view(&turns, 1, device);

        let shape = [batch_size, dialog_length];
        let label = int_tensor::<B, 2>(flatten(batch.per_turn(LABEL_NAME)?), shape, device);
        let domain_label = int_tensor::<B, 2>(flatten(batch.per_turn(DOMAIN_LABEL_NAME)?), shape, device);
        let label_mask = int_tensor::<B, 2>(self.label_mask(batch)?, shape, device);

        // fresh per call; the model refines these priors itself
        let initial_state = Tensor::<B, 2>::zeros([batch_size, self.num_states], device);
        let initial_sample = Tensor::<B, 2>::zeros([batch_size, self.num_states], device);

        tracing::debug!(
            "Preprocessed batch: {} dialogues x {} turns x {} tokens",
            batch_size,
            dialog_length,
            self.seq_length
        );

        Ok(VrnnFeatures {
            input_1,
            input_2,
            label,
            label_mask,
            initial_state,
            initial_sample,
            domain_label,
        })
    }

    /// Tokenise every turn of the strategy's input field exactly once.
    fn tokenize_turns(&self, batch: &RawDialogBatch) -> Result<Vec<Vec<TokenizedTurn>>, PreprocessError> {
        let field_name = self.strategy.input_field();
        let field = batch.field(field_name)?;
        if matches!(field, FieldValue::PerTurn(_) | FieldValue::TurnIds(_)) {
            return Err(PreprocessError::FieldKind {
                field: field_name.to_string(),
                expected: "token ids or text",
                actual: field.kind(),
            });
        }

        let mut turns = Vec::with_capacity(batch.batch_size());
        for i in 0..batch.batch_size() {
            let mut row = Vec::with_capacity(self.dialog_length);
            for j in 0..self.dialog_length {
                let input = field.turn_input(i, j).ok_or_else(|| PreprocessError::ShapeMismatch {
                    field: field_name.to_string(),
                    expected: vec![batch.batch_size(), self.dialog_length],
                    actual: vec![i, j],
                })?;
                let turn = self.strategy.tokenize(input).map_err(|e| e.at_turn(i, j))?;
                if turn.ids.len() != self.seq_length || turn.mask.len() != self.seq_length {
                    return Err(PreprocessError::ShapeMismatch {
                        field: INPUT_ID_NAME.to_string(),
                        expected: vec![self.seq_length],
                        actual: vec![turn.ids.len().max(turn.mask.len())],
                    });
                }
                row.push(turn);
            }
            turns.push(row);
        }
        Ok(turns)
    }

    /// Stack the turns into [b, d, s] tensors, reading turn `j + shift`
    /// for position `j` and the empty turn past the end of a dialogue.
    fn stack_view<B: Backend>(
        &self,
        turns: &[Vec<TokenizedTurn>],
        shift: usize,
        device: &B::Device,
    ) -> TokenizedInput<B> {
        let empty = self.strategy.empty_turn();
        let capacity = turns.len() * self.dialog_length * self.seq_length;
        let mut ids = Vec::with_capacity(capacity);
        let mut mask = Vec::with_capacity(capacity);

        for row in turns {
            for j in 0..self.dialog_length {
                let turn = row.get(j + shift).unwrap_or(&empty);
                ids.extend(turn.ids.iter().map(|&x| x as i64));
                mask.extend(turn.mask.iter().map(|&x| x as i64));
            }
        }

        let shape = [turns.len(), self.dialog_length, self.seq_length];
        TokenizedInput {
            input_word_ids: int_tensor::<B, 3>(ids, shape, device),
            input_mask: int_tensor::<B, 3>(mask, shape, device),
        }
    }

    fn label_mask(&self, batch: &RawDialogBatch) -> Result<Vec<i64>, PreprocessError> {
        match &self.labeled_dialog_turn_ids {
            Some(labeled) => Ok(batch
                .turn_ids(DIAL_TURN_ID_NAME)?
                .iter()
                .flatten()
                .map(|id| i64::from(labeled.contains(id)))
                .collect()),
            None => Ok(flatten(batch.per_turn(TURN_MASK_NAME)?)),
        }
    }
}

fn flatten(rows: &[Vec<i64>]) -> Vec<i64> {
    rows.iter().flatten().copied().collect()
}

fn int_tensor<B: Backend, const D: usize>(
    flat: Vec<i64>,
    shape: [usize; D],
    device: &B::Device,
) -> Tensor<B, D, Int> {
    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape(shape)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{sample_dialogs, TestBackend, WordLengthModel};
    use crate::data::raw_batch::UTTERANCE_IDS_NAME;
    use crate::data::tokenization::{IndexTokenizer, SubwordTokenizer};
    use crate::domain::error::ErrorKind;

    const DIALOG_LENGTH: usize = 6;
    const SEQ_LENGTH: usize = 8;
    const NUM_STATES: i64 = 5;

    fn index_strategy() -> Arc<dyn TokenizationStrategy> {
        Arc::new(IndexTokenizer::new(SEQ_LENGTH).unwrap())
    }

    fn subword_strategy() -> Arc<dyn TokenizationStrategy> {
        Arc::new(SubwordTokenizer::new(Arc::new(WordLengthModel::new(SEQ_LENGTH))).unwrap())
    }

    fn config() -> PreprocessorConfig {
        PreprocessorConfig::new(NUM_STATES, DIALOG_LENGTH, SEQ_LENGTH)
    }

    fn raw_batch() -> RawDialogBatch {
        RawDialogBatch::from_records(&sample_dialogs(), DIALOG_LENGTH).unwrap()
    }

    fn run(strategy: Arc<dyn TokenizationStrategy>, config: PreprocessorConfig) -> VrnnFeatures<TestBackend> {
        let pre = DataPreprocessor::new(strategy, config).unwrap();
        pre.create_feature_and_label::<TestBackend>(&raw_batch(), &Default::default())
            .unwrap()
    }

    fn ints<const D: usize>(t: Tensor<TestBackend, D, Int>) -> Vec<i64> {
        t.into_data().convert::<i64>().to_vec::<i64>().unwrap()
    }

    fn floats<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
        t.into_data().convert::<f32>().to_vec::<f32>().unwrap()
    }

    /// Slice of a flattened [b, d, s] tensor for turn (i, j).
    fn turn_slice(flat: &[i64], i: usize, j: usize) -> &[i64] {
        let start = (i * DIALOG_LENGTH + j) * SEQ_LENGTH;
        &flat[start..start + SEQ_LENGTH]
    }

    fn assert_shapes(features: &VrnnFeatures<TestBackend>) {
        for input in [&features.input_1, &features.input_2] {
            for key in [INPUT_ID_NAME, INPUT_MASK_NAME] {
                assert_eq!(input.get(key).unwrap().dims(), [2, DIALOG_LENGTH, SEQ_LENGTH]);
            }
        }
        for t in [&features.label, &features.label_mask, &features.domain_label] {
            assert_eq!(t.dims(), [2, DIALOG_LENGTH]);
        }
        for t in [&features.initial_state, &features.initial_sample] {
            assert_eq!(t.dims(), [2, NUM_STATES as usize]);
        }
    }

    #[test]
    fn test_output_shapes_index() {
        assert_shapes(&run(index_strategy(), config()));
    }

    #[test]
    fn test_output_shapes_subword() {
        assert_shapes(&run(subword_strategy(), config()));
    }

    #[test]
    fn test_strategies_agree_on_geometry() {
        let a = run(index_strategy(), config());
        let b = run(subword_strategy(), config());
        assert_eq!(a.input_1.input_word_ids.dims(), b.input_1.input_word_ids.dims());
        assert_eq!(a.input_2.input_mask.dims(), b.input_2.input_mask.dims());
        assert_eq!(a.label_mask.dims(), b.label_mask.dims());
        assert_eq!(a.initial_state.dims(), b.initial_state.dims());
        // same turns are real under both schemes
        assert_eq!(ints(a.label_mask), ints(b.label_mask));
    }

    #[test]
    fn test_next_view_is_shifted_current_view() {
        for strategy in [index_strategy(), subword_strategy()] {
            let f = run(strategy, config());
            let ids_1 = ints(f.input_1.input_word_ids);
            let ids_2 = ints(f.input_2.input_word_ids);
            let mask_1 = ints(f.input_1.input_mask);
            let mask_2 = ints(f.input_2.input_mask);

            for i in 0..2 {
                for t in 0..DIALOG_LENGTH - 1 {
                    assert_eq!(turn_slice(&ids_2, i, t), turn_slice(&ids_1, i, t + 1));
                    assert_eq!(turn_slice(&mask_2, i, t), turn_slice(&mask_1, i, t + 1));
                }
                // no successor: padded independently per dialogue
                let last = DIALOG_LENGTH - 1;
                assert!(turn_slice(&ids_2, i, last).iter().all(|&x| x == 0));
                assert!(turn_slice(&mask_2, i, last).iter().all(|&x| x == 0));
            }
        }
    }

    #[test]
    fn test_index_view_pads_and_truncates_turns() {
        let f = run(index_strategy(), config());
        let mask = ints(f.input_1.input_mask);
        // "hello there" → 2 tokens
        assert_eq!(turn_slice(&mask, 0, 0), &[1, 1, 0, 0, 0, 0, 0, 0]);
        // 9-word turn keeps its first 8 tokens
        assert_eq!(turn_slice(&mask, 1, 2), &[1; 8]);
        // padding turn
        assert_eq!(turn_slice(&mask, 0, 5), &[0; 8]);
    }

    #[test]
    fn test_sparse_label_mask() {
        let labeled = vec![(0, 2), (1, 3), (1, 5)];
        let f = run(index_strategy(), config().with_labeled_dialog_turn_ids(labeled.clone()));
        let mask = ints(f.label_mask);
        for i in 0..2 {
            for j in 0..DIALOG_LENGTH {
                let expected = i64::from(labeled.contains(&(i, j)));
                assert_eq!(mask[i * DIALOG_LENGTH + j], expected, "position ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_sparse_label_mask_ignores_other_batches() {
        // dialogue 7 is not in this batch
        let f = run(index_strategy(), config().with_labeled_dialog_turn_ids(vec![(7, 1)]));
        assert!(ints(f.label_mask).iter().all(|&x| x == 0));
    }

    #[test]
    fn test_default_label_mask_is_turn_validity() {
        let f = run(index_strategy(), config());
        let expected: Vec<i64> = raw_batch()
            .per_turn(TURN_MASK_NAME)
            .unwrap()
            .iter()
            .flatten()
            .copied()
            .collect();
        assert_eq!(ints(f.label_mask), expected);
    }

    #[test]
    fn test_labels_pass_through() {
        let f = run(index_strategy(), config());
        assert_eq!(ints(f.label), vec![1, 2, 3, 4, 0, 0, 1, 2, 3, 2, 4, 0]);
        assert_eq!(ints(f.domain_label), vec![3, 3, 3, 3, 0, 0, 2, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_calls_are_deterministic() {
        let pre = DataPreprocessor::new(
            index_strategy(),
            config().with_labeled_dialog_turn_ids(vec![(0, 1)]),
        )
        .unwrap();
        let batch = raw_batch();
        let device = Default::default();
        let a = pre.create_feature_and_label::<TestBackend>(&batch, &device).unwrap();
        let b = pre.create_feature_and_label::<TestBackend>(&batch, &device).unwrap();

        assert_eq!(floats(a.initial_state.clone()), floats(b.initial_state));
        assert_eq!(floats(a.initial_sample.clone()), floats(b.initial_sample));
        assert_eq!(ints(a.label_mask), ints(b.label_mask));
        assert!(floats(a.initial_state).iter().all(|&x| x == 0.0));
        assert!(floats(a.initial_sample).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let f = run(index_strategy(), config());
        let (input_1, input_2, _label, label_mask, initial_state, _sample, _domain) = f.into_tuple();
        assert_eq!(input_1.input_word_ids.dims(), [2, 6, 8]);
        assert_eq!(input_2.input_word_ids.dims(), [2, 6, 8]);
        assert_eq!(
            ints(label_mask),
            vec![1, 1, 1, 1, 0, 0, 1, 1, 1, 1, 1, 1]
        );
        assert_eq!(initial_state.dims(), [2, 5]);
        assert!(floats(initial_state).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_rejects_non_positive_num_states() {
        for bad in [0, -1] {
            let err = DataPreprocessor::new(index_strategy(), PreprocessorConfig::new(bad, 6, 8)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert!(matches!(err, PreprocessError::InvalidConfig { field: "num_states", .. }));
        }
    }

    #[test]
    fn test_rejects_zero_lengths() {
        let err = DataPreprocessor::new(index_strategy(), PreprocessorConfig::new(5, 0, 8)).unwrap_err();
        assert!(matches!(err, PreprocessError::InvalidConfig { field: "max_dialog_length", .. }));
    }

    #[test]
    fn test_rejects_strategy_length_mismatch() {
        let err = DataPreprocessor::new(index_strategy(), PreprocessorConfig::new(5, 6, 16)).unwrap_err();
        assert!(matches!(err, PreprocessError::InvalidConfig { field: "max_seq_length", .. }));
    }

    #[test]
    fn test_rejects_coordinate_beyond_dialog_length() {
        let err = DataPreprocessor::new(
            index_strategy(),
            config().with_labeled_dialog_turn_ids(vec![(0, 1), (1, 6)]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PreprocessError::CoordinateOutOfRange { dialog: 1, turn: 6, max_dialog_length: 6 }
        );
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_missing_field_is_contract_violation() {
        let pre = DataPreprocessor::new(index_strategy(), config()).unwrap();
        let mut batch = raw_batch();
        batch.remove(UTTERANCE_IDS_NAME);
        let err = pre
            .create_feature_and_label::<TestBackend>(&batch, &Default::default())
            .unwrap_err();
        assert_eq!(err, PreprocessError::MissingField { field: UTTERANCE_IDS_NAME.into() });
        assert_eq!(err.kind(), ErrorKind::ContractViolation);
    }

    #[test]
    fn test_turn_mask_not_needed_with_coordinates() {
        let pre = DataPreprocessor::new(
            index_strategy(),
            config().with_labeled_dialog_turn_ids(vec![(0, 0)]),
        )
        .unwrap();
        let mut batch = raw_batch();
        batch.remove(TURN_MASK_NAME);
        assert!(pre
            .create_feature_and_label::<TestBackend>(&batch, &Default::default())
            .is_ok());
    }

    #[test]
    fn test_rejects_wrong_dialog_length() {
        let pre = DataPreprocessor::new(index_strategy(), config()).unwrap();
        let batch = RawDialogBatch::from_records(&sample_dialogs(), 4).unwrap();
        let err = pre
            .create_feature_and_label::<TestBackend>(&batch, &Default::default())
            .unwrap_err();
        assert_eq!(
            err,
            PreprocessError::ShapeMismatch {
                field: "batch".into(),
                expected: vec![2, 6],
                actual: vec![2, 4],
            }
        );
    }

    #[test]
    fn test_subword_shape_violation_surfaces() {
        let model = WordLengthModel { max_seq_length: SEQ_LENGTH, emit_length: SEQ_LENGTH - 1 };
        let strategy: Arc<dyn TokenizationStrategy> =
            Arc::new(SubwordTokenizer::new(Arc::new(model)).unwrap());
        let pre = DataPreprocessor::new(strategy, config()).unwrap();
        let err = pre
            .create_feature_and_label::<TestBackend>(&raw_batch(), &Default::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContractViolation);
    }

    #[test]
    fn test_tokenizer_failure_names_the_turn() {
        let mut records = sample_dialogs();
        records[1].turns[3].utterance = "<boom>".to_string();
        let batch = RawDialogBatch::from_records(&records, DIALOG_LENGTH).unwrap();
        let pre = DataPreprocessor::new(subword_strategy(), config()).unwrap();
        let err = pre
            .create_feature_and_label::<TestBackend>(&batch, &Default::default())
            .unwrap_err();
        assert!(matches!(err, PreprocessError::Tokenizer { dialog: 1, turn: 3, .. }));
    }

    #[test]
    fn test_unknown_key_lookup() {
        let f = run(index_strategy(), config());
        assert!(f.input_1.get("input_type_ids").is_none());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let json = r#"{"num_states": 5, "max_dialog_length": 6, "max_seq_length": 8,
                       "labeled_dialog_turn_ids": [[0, 2], [1, 3]]}"#;
        let cfg: PreprocessorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg, config().with_labeled_dialog_turn_ids(vec![(0, 2), (1, 3)]));
    }
}
