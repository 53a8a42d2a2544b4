//! Settings of a [`VsEnsemble`](super::VsEnsemble).
use crate::Sample;
use crate::fold::FoldAssignment;
use crate::metric::EvalMetric;


/// Default number of folds of the shared assignment.
pub const DEFAULT_N_FOLDS: usize = 4;
/// Default number of folds held out as the test split.
pub const DEFAULT_HELD_OUT_FOLDS: usize = 1;
/// Default seed of the fold assignment and the boosters.
pub const DEFAULT_SEED: u64 = 2016;


/// Settings of a stacked ensemble.
///
/// # Example
/// ```
/// use vsboosts::prelude::*;
/// let config = EnsembleConfig::new(EvalMetric::RocAuc)
///     .n_folds(5)
///     .seed(7)
///     .layer2_metrics(vec![EvalMetric::RocAuc, EvalMetric::Efr1]);
/// assert_eq!(config.layer2_metric_list().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct EnsembleConfig {
    pub(crate) eval_metric: EvalMetric,
    pub(crate) n_folds: usize,
    pub(crate) held_out_folds: usize,
    pub(crate) seed: u64,
    pub(crate) layer2_metrics: Vec<EvalMetric>,
    pub(crate) verbose: bool,
    pub(crate) external_test: Option<Vec<Sample>>,
    pub(crate) fold_assignment: Option<FoldAssignment>,
}


impl EnsembleConfig {
    /// Construct the default settings, selecting models by `eval_metric`.
    pub fn new(eval_metric: EvalMetric) -> Self {
        Self {
            eval_metric,
            n_folds: DEFAULT_N_FOLDS,
            held_out_folds: DEFAULT_HELD_OUT_FOLDS,
            seed: DEFAULT_SEED,
            layer2_metrics: Vec::new(),
            verbose: false,
            external_test: None,
            fold_assignment: None,
        }
    }


    /// Set the number of folds.
    /// Default value is `4`.
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the number of folds held out as the test split.
    /// Ignored when an external test set is given.
    /// Default value is `1`.
    pub fn held_out_folds(mut self, n: usize) -> Self {
        self.held_out_folds = n;
        self
    }


    /// Set the seed.
    /// Default value is `2016`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the metrics of the second-layer models.
    /// An empty list means the selection metric only.
    pub fn layer2_metrics(mut self, metrics: Vec<EvalMetric>) -> Self {
        self.layer2_metrics = metrics;
        self
    }


    /// Print progress tables.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Score on separately supplied test sets,
    /// one per input, labeled with the primary label.
    pub fn external_test(mut self, test: Vec<Sample>) -> Self {
        self.external_test = Some(test);
        self
    }


    /// Use a precomputed fold assignment instead of generating one.
    pub fn fold_assignment(mut self, folds: FoldAssignment) -> Self {
        self.fold_assignment = Some(folds);
        self
    }


    /// Returns the selection metric.
    pub fn eval_metric(&self) -> EvalMetric {
        self.eval_metric
    }


    /// Returns the metrics of the second-layer models.
    pub fn layer2_metric_list(&self) -> Vec<EvalMetric> {
        if self.layer2_metrics.is_empty() {
            vec![self.eval_metric]
        } else {
            self.layer2_metrics.clone()
        }
    }
}
