use rayon::prelude::*;

use crate::{Sample, RegressionTree};
use super::bin::*;
use super::regression_tree_algorithm::TreeParams;


/// The number of bins set as default.
pub const DEFAULT_NBIN: usize = 255;
/// The maxmial depth set as default.
pub const DEFAULT_MAX_DEPTH: usize = 2;
/// Default L2-regularization parameter
pub const DEFAULT_LAMBDA_L2: f64 = 0.01;


/// A struct that builds `RegressionTree`.
/// `RegressionTreeBuilder` keeps parameters for constructing `RegressionTree`.
///
/// # Example
///
/// ```no_run
/// use vsboosts::prelude::*;
/// # let sample = Sample::from_columns(vec![], vec![]).unwrap();
///
/// let weak_learner = RegressionTreeBuilder::new(&sample)
///     .max_depth(4)
///     .lambda_l2(1.0)
///     .min_child_weight(1.0)
///     .colsample(0.8)
///     .seed(7)
///     .build();
/// ```
#[derive(Clone)]
pub struct RegressionTreeBuilder<'a> {
    sample: &'a Sample,
    /// Maximal number of bins per feature.
    n_bins: usize,

    params: TreeParams,

    seed: u64,
}


impl<'a> RegressionTreeBuilder<'a> {
    /// Construct a new instance of `RegressionTreeBuilder`.
    /// By default,
    /// `RegressionTreeBuilder` sets the parameters as follows;
    /// ```text
    /// n_bins: DEFAULT_NBIN == 255,
    /// max_depth: DEFAULT_MAX_DEPTH == 2,
    /// lambda_l2: DEFAULT_LAMBDA_L2 == 0.01,
    /// gamma: 0,
    /// min_child_weight: 0,
    /// subsample: 1,
    /// colsample: 1,
    /// ```
    pub fn new(sample: &'a Sample) -> Self {
        let params = TreeParams {
            max_depth: DEFAULT_MAX_DEPTH,
            lambda_l2: DEFAULT_LAMBDA_L2,
            gamma: 0.0,
            min_child_weight: 0.0,
            subsample: 1.0,
            colsample: 1.0,
        };
        Self { sample, n_bins: DEFAULT_NBIN, params, seed: 0, }
    }


    /// Set the maximal number of bins per feature.
    /// Default is `255`.
    pub fn n_bins(mut self, n_bins: usize) -> Self {
        self.n_bins = n_bins;
        self
    }


    /// Specify the maximal depth of the tree.
    /// Default maximal depth is `2`.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.params.max_depth = depth;
        self
    }


    /// Set the L2-regularization parameter on the leaf values.
    pub fn lambda_l2(mut self, lambda_l2: f64) -> Self {
        self.params.lambda_l2 = lambda_l2;
        self
    }


    /// Set the minimal gain a split must exceed.
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.params.gamma = gamma;
        self
    }


    /// Set the minimal Hessian sum of a child.
    pub fn min_child_weight(mut self, min_child_weight: f64) -> Self {
        self.params.min_child_weight = min_child_weight;
        self
    }


    /// Set the fraction of examples each tree is grown on.
    /// Values outside `(0, 1]` are clamped.
    pub fn subsample(mut self, ratio: f64) -> Self {
        self.params.subsample = clamp_ratio(ratio);
        self
    }


    /// Set the fraction of features each tree may split on.
    /// Values outside `(0, 1]` are clamped.
    pub fn colsample(mut self, ratio: f64) -> Self {
        self.params.colsample = clamp_ratio(ratio);
        self
    }


    /// Set the seed of the row/column sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Build a `RegressionTree`.
    /// This method consumes `self`.
    pub fn build(self) -> RegressionTree {
        let n_bins = self.n_bins;
        let bins = self.sample.features()
            .par_iter()
            .map(|feature| {
                let n_bin = feature.distinct_value_count().min(n_bins);
                Bins::cut(feature, n_bin)
            })
            .collect::<Vec<_>>();

        RegressionTree::from_components(bins, self.params, self.seed)
    }
}


fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 { ratio.min(1.0) } else { 1.0 }
}
