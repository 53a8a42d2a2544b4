//! Cross-validation folds and the outer test split of one feature set.
use tracing::debug;

use crate::error::{Result, ScreeningError};
use crate::fold::FoldAssignment;
use crate::sample::{check_binary, Sample};


/// Whether a label is a binary class or a continuous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Labels in `{0, 1}`.
    Binary,
    /// Any other numeric labels.
    Continuous,
}


impl LabelKind {
    /// Detect the kind of `labels`.
    pub fn of(labels: &[f64]) -> Self {
        if check_binary(labels).is_ok() { Self::Binary } else { Self::Continuous }
    }


    /// Lower-case name used in model names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Continuous => "continuous",
        }
    }
}


/// Where the outer test split comes from.
#[derive(Debug, Clone)]
pub enum OuterSplit {
    /// The last `n` folds of the assignment form the test split.
    /// The remaining folds form the cross-validation rotation.
    HeldOutFolds(usize),
    /// A separately supplied test sample (with target).
    /// Every fold of the assignment is used for cross-validation.
    External(Sample),
}


impl Default for OuterSplit {
    fn default() -> Self {
        Self::HeldOutFolds(1)
    }
}


/// The cross-validation fold of every training example,
/// in training order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldLayout {
    folds: Vec<usize>,
    n_folds: usize,
}


impl FoldLayout {
    /// Returns the number of cross-validation folds.
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }


    /// Returns the fold of every training example.
    pub fn folds(&self) -> &[usize] {
        &self.folds[..]
    }


    /// Returns the number of training examples.
    pub fn len(&self) -> usize {
        self.folds.len()
    }


    /// Returns `true` if there is no training example.
    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }


    fn positions(&self, fold: usize, in_fold: bool) -> Vec<usize> {
        self.folds.iter()
            .enumerate()
            .filter_map(|(p, &f)| ((f == fold) == in_fold).then_some(p))
            .collect()
    }
}


/// Immutable train/validation folds plus an outer test split.
///
/// `train_fold(i)` and `validation_fold(i)` partition the training examples
/// for every fold `i`, and the test split never overlaps the training set.
#[derive(Debug, Clone)]
pub struct DataBundle {
    training: Sample,
    training_rows: Vec<usize>,
    layout: FoldLayout,
    train_folds: Vec<Sample>,
    validation_folds: Vec<Sample>,
    validation_positions: Vec<Vec<usize>>,
    test: Sample,
    test_rows: Option<Vec<usize>>,
    label_kind: LabelKind,
}


impl DataBundle {
    /// Build the folds of `sample` from `assignment`.
    /// `sample` must hold one labeled row per assigned example.
    pub fn build(
        assignment: &FoldAssignment,
        sample: Sample,
        outer: OuterSplit,
    ) -> Result<Self>
    {
        let (n_sample, n_feature) = sample.shape();
        if n_sample != assignment.len() {
            return Err(ScreeningError::DataShape(format!(
                "the fold assignment covers {} examples, the sample has {n_sample}",
                assignment.len(),
            )));
        }
        if !sample.has_target() {
            return Err(ScreeningError::DataShape(
                "the sample has no labels".into()
            ));
        }

        let k = assignment.n_folds();
        let folds = assignment.folds();
        match outer {
            OuterSplit::HeldOutFolds(n) => {
                if n == 0 || k < n + 2 {
                    return Err(ScreeningError::Config(format!(
                        "cannot hold out {n} of {k} folds: \
                         at least 2 folds must remain for cross-validation"
                    )));
                }
                let n_cv = k - n;
                let (training_rows, test_rows): (Vec<usize>, Vec<usize>) =
                    (0..n_sample).partition(|&i| folds[i] < n_cv);
                let layout = FoldLayout {
                    folds: training_rows.iter().map(|&i| folds[i]).collect(),
                    n_folds: n_cv,
                };
                let training = sample.subset(&training_rows);
                let test = sample.subset(&test_rows);
                Self::assemble(training, training_rows, layout, test, Some(test_rows))
            },
            OuterSplit::External(test) => {
                if test.shape().1 != n_feature {
                    return Err(ScreeningError::DataShape(format!(
                        "the test sample has {} features, expected {n_feature}",
                        test.shape().1,
                    )));
                }
                if !test.has_target() {
                    return Err(ScreeningError::DataShape(
                        "the external test sample has no labels".into()
                    ));
                }
                let layout = FoldLayout { folds: folds.to_vec(), n_folds: k };
                let training_rows = (0..n_sample).collect();
                Self::assemble(sample, training_rows, layout, test, None)
            },
        }
    }


    /// Build a bundle that reuses an existing fold layout.
    /// `training` must be in the training order of `layout`.
    pub fn from_layout(
        layout: &FoldLayout,
        training_rows: &[usize],
        training: Sample,
        test: Sample,
    ) -> Result<Self>
    {
        if training.shape().0 != layout.len() {
            return Err(ScreeningError::DataShape(format!(
                "the fold layout covers {} examples, the sample has {}",
                layout.len(), training.shape().0,
            )));
        }
        if test.shape().1 != training.shape().1 {
            return Err(ScreeningError::DataShape(format!(
                "the test sample has {} features, expected {}",
                test.shape().1, training.shape().1,
            )));
        }
        Self::assemble(
            training, training_rows.to_vec(), layout.clone(), test, None,
        )
    }


    fn assemble(
        training: Sample,
        training_rows: Vec<usize>,
        layout: FoldLayout,
        test: Sample,
        test_rows: Option<Vec<usize>>,
    ) -> Result<Self>
    {
        let label_kind = LabelKind::of(training.target());

        let mut train_folds = Vec::with_capacity(layout.n_folds);
        let mut validation_folds = Vec::with_capacity(layout.n_folds);
        let mut validation_positions = Vec::with_capacity(layout.n_folds);
        for fold in 0..layout.n_folds {
            let train_ix = layout.positions(fold, false);
            let valid_ix = layout.positions(fold, true);
            if train_ix.is_empty() || valid_ix.is_empty() {
                return Err(ScreeningError::DataShape(format!(
                    "fold {fold} has an empty train or validation split"
                )));
            }
            train_folds.push(training.subset(&train_ix));
            validation_folds.push(training.subset(&valid_ix));
            validation_positions.push(valid_ix);
        }

        debug!(
            n_train = training.shape().0,
            n_test = test.shape().0,
            n_folds = layout.n_folds,
            label_kind = label_kind.name(),
            "built data bundle",
        );

        Ok(Self {
            training,
            training_rows,
            layout,
            train_folds,
            validation_folds,
            validation_positions,
            test,
            test_rows,
            label_kind,
        })
    }


    /// Returns the training split of fold `i`.
    pub fn train_fold(&self, i: usize) -> &Sample {
        &self.train_folds[i]
    }


    /// Returns the validation split of fold `i`.
    pub fn validation_fold(&self, i: usize) -> &Sample {
        &self.validation_folds[i]
    }


    /// Returns the outer test split.
    pub fn test(&self) -> &Sample {
        &self.test
    }


    /// Returns every training example, in training order.
    pub fn training(&self) -> &Sample {
        &self.training
    }


    /// Returns the number of cross-validation folds.
    pub fn n_folds(&self) -> usize {
        self.layout.n_folds
    }


    /// Returns the fold layout of the training examples.
    pub fn layout(&self) -> &FoldLayout {
        &self.layout
    }


    /// Returns the original indices of the training examples.
    pub fn training_rows(&self) -> &[usize] {
        &self.training_rows[..]
    }


    /// Returns the original indices of the test examples,
    /// or `None` if the test split was supplied separately.
    pub fn test_rows(&self) -> Option<&[usize]> {
        self.test_rows.as_deref()
    }


    /// Returns the positions (within the training set)
    /// of the validation examples of fold `i`.
    pub fn validation_positions(&self, i: usize) -> &[usize] {
        &self.validation_positions[i][..]
    }


    /// Returns the label kind.
    pub fn label_kind(&self) -> LabelKind {
        self.label_kind
    }


    /// Returns the labels of the training examples.
    pub fn training_labels(&self) -> &[f64] {
        self.training.target()
    }


    /// Returns the labels of the test examples.
    pub fn test_labels(&self) -> &[f64] {
        self.test.target()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Feature;

    fn toy(n: usize) -> Sample {
        let x = (0..n).map(|i| i as f64).collect();
        let y = (0..n).map(|i| (i % 2) as f64).collect();
        Sample::from_columns(vec![Feature::from_values("x", x)], y).unwrap()
    }

    #[test]
    fn held_out_folds_form_the_test_split() {
        let folds = (0..12).map(|i| i % 4).collect();
        let assignment = FoldAssignment::from_folds(folds, 4, 0).unwrap();
        let bundle = DataBundle::build(&assignment, toy(12), OuterSplit::default())
            .unwrap();

        assert_eq!(bundle.n_folds(), 3);
        assert_eq!(bundle.test_rows(), Some(&[3, 7, 11][..]));
        assert_eq!(bundle.training_rows().len(), 9);
        for i in 0..3 {
            let n = bundle.train_fold(i).shape().0 + bundle.validation_fold(i).shape().0;
            assert_eq!(n, 9);
        }
        assert_eq!(bundle.label_kind(), LabelKind::Binary);
    }

    #[test]
    fn too_many_held_out_folds() {
        let folds = (0..6).map(|i| i % 3).collect();
        let assignment = FoldAssignment::from_folds(folds, 3, 0).unwrap();
        let err = DataBundle::build(&assignment, toy(6), OuterSplit::HeldOutFolds(2))
            .unwrap_err();
        assert!(matches!(err, ScreeningError::Config(_)));
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let folds = (0..6).map(|i| i % 3).collect();
        let assignment = FoldAssignment::from_folds(folds, 3, 0).unwrap();
        let err = DataBundle::build(&assignment, toy(5), OuterSplit::default())
            .unwrap_err();
        assert!(matches!(err, ScreeningError::DataShape(_)));
    }
}
