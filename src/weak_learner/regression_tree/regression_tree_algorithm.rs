use rand::prelude::*;
use rand::seq::index;
use rayon::prelude::*;

use crate::{
    common::GradientHessian,
    Sample,
    WeakLearner,
};
use super::bin::*;
use super::node::*;
use super::split_rule::*;
use super::regression_tree_regressor::RegressionTreeRegressor;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};


/// Growth parameters of a regression tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TreeParams {
    pub(crate) max_depth: usize,
    pub(crate) lambda_l2: f64,
    pub(crate) gamma: f64,
    pub(crate) min_child_weight: f64,
    pub(crate) subsample: f64,
    pub(crate) colsample: f64,
}


#[derive(Debug, Clone, Copy)]
struct Split {
    gain: f64,
    feature: usize,
    threshold: f64,
}


/// `RegressionTree` is the factory that generates
/// a `RegressionTreeRegressor` for given gradients and Hessians.
///
/// Every feature is cut into equal-width bins once, at build time.
/// A node is split where the second-order gain
/// ```text
/// 0.5 * [ GL^2 / (HL + lambda) + GR^2 / (HR + lambda) - G^2 / (H + lambda) ] - gamma
/// ```
/// is largest and positive,
/// and a leaf predicts `-G / (H + lambda)`.
///
/// # Example
/// ```no_run
/// use vsboosts::prelude::*;
/// # let sample = Sample::from_columns(vec![], vec![]).unwrap();
///
/// let tree = RegressionTreeBuilder::new(&sample)
///     .max_depth(2)
///     .build();
///
/// let n_sample = sample.shape().0;
/// let gh = Objective::Regression.gradient_hessian(
///     &vec![0.0; n_sample], sample.target(),
/// );
/// let f = tree.produce(&sample, &gh);
/// let predictions = f.predict_all(&sample);
/// ```
pub struct RegressionTree {
    bins: Vec<Bins>,
    params: TreeParams,
    seed: u64,
    // Number of trees produced so far; varies the sampling per round.
    round: AtomicU64,
}


impl RegressionTree {
    #[inline]
    pub(super) fn from_components(
        bins: Vec<Bins>,
        params: TreeParams,
        seed: u64,
    ) -> Self
    {
        Self { bins, params, seed, round: AtomicU64::new(0), }
    }


    fn grow(
        &self,
        sample: &Sample,
        gh: &[GradientHessian],
        indices: Vec<usize>,
        columns: &[usize],
        max_depth: usize,
    ) -> Box<Node>
    {
        let total = indices.iter()
            .fold(BinStat::default(), |acc, &i| acc + BinStat {
                grad: gh[i].grad, hess: gh[i].hess, count: 1,
            });

        // Compute the best prediction that minimizes the training error
        // on this node.
        let prediction = - total.grad / (total.hess + self.params.lambda_l2);

        if max_depth < 1 || indices.len() < 2 {
            return Box::new(Node::leaf(prediction));
        }

        let split = best_split(
            &self.bins, columns, sample, gh, &indices[..], total, &self.params,
        );
        let Some(split) = split else {
            return Box::new(Node::leaf(prediction));
        };

        let rule = Splitter::new(split.feature, split.threshold);

        // Split the train data for left/right childrens
        let (lindices, rindices): (Vec<usize>, Vec<usize>) = indices.into_iter()
            .partition(|&i| rule.split(sample, i) == LeftRight::Left);

        // If the split has no meaning, construct a leaf node.
        if lindices.is_empty() || rindices.is_empty() {
            return Box::new(Node::leaf(prediction));
        }

        let ltree = self.grow(sample, gh, lindices, columns, max_depth - 1);
        let rtree = self.grow(sample, gh, rindices, columns, max_depth - 1);

        Box::new(Node::branch(rule, ltree, rtree, prediction))
    }
}


/// Draw `ratio * n` (at least one) of `0..n` in ascending order.
fn draw(rng: &mut StdRng, n: usize, ratio: f64) -> Vec<usize> {
    if n == 0 || ratio >= 1.0 {
        return (0..n).collect();
    }
    let amount = ((n as f64 * ratio).ceil() as usize).clamp(1, n);
    let mut drawn = index::sample(rng, n, amount).into_vec();
    drawn.sort_unstable();
    drawn
}


impl WeakLearner for RegressionTree {
    type Hypothesis = RegressionTreeRegressor;


    fn name(&self) -> &str {
        "Regression Tree"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let n_bins = self.bins.iter()
            .map(|bin| bin.len())
            .max()
            .unwrap_or(0);
        let info = Vec::from([
            ("# of bins (max)", format!("{n_bins}")),
            ("Max depth", format!("{}", self.params.max_depth)),
            ("Regularization param.", format!("{}", self.params.lambda_l2)),
            ("Min. split gain", format!("{}", self.params.gamma)),
            ("Min. child weight", format!("{}", self.params.min_child_weight)),
            ("Row subsample", format!("{}", self.params.subsample)),
            ("Column subsample", format!("{}", self.params.colsample)),
        ]);
        Some(info)
    }


    fn produce(&self, sample: &Sample, gh: &[GradientHessian])
        -> Self::Hypothesis
    {
        let round = self.round.fetch_add(1, Ordering::Relaxed);
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(round));

        let (n_sample, n_feature) = sample.shape();
        let indices = draw(&mut rng, n_sample, self.params.subsample);
        let columns = draw(&mut rng, n_feature.min(self.bins.len()), self.params.colsample);

        let root = self.grow(
            sample, gh, indices, &columns[..], self.params.max_depth,
        );

        RegressionTreeRegressor::from(root)
    }
}


impl fmt::Display for RegressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\
            ----------\n\
            # Regression Tree Weak Learner\n\n\
            - Max depth: {}\n\
            - Lambda: {}\n\
            - Bins:\
            ",
            self.params.max_depth,
            self.params.lambda_l2,
        )?;

        let max_bin_width = self.bins.iter()
            .map(|bin| bin.len().ilog10() as usize)
            .max()
            .unwrap_or(0)
            + 1;
        for (j, feat_bins) in self.bins.iter().enumerate() {
            let n_bins = feat_bins.len();
            writeln!(
                f,
                "\t* [x{j: <6} | {n_bins: >max_bin_width$} bins]  {feat_bins}"
            )?;
        }

        write!(f, "----------")
    }
}


/// Returns the best splitting rule over `columns`.
/// Equal gains go to the smaller feature index.
fn best_split(
    bins: &[Bins],
    columns: &[usize],
    sample: &Sample,
    gh: &[GradientHessian],
    indices: &[usize],
    total: BinStat,
    params: &TreeParams,
) -> Option<Split>
{
    let features = sample.features();
    columns.par_iter()
        .filter_map(|&j| {
            let bin = &bins[j];
            if !bin.is_splittable() {
                return None;
            }
            let pack = bin.pack(indices, &features[j], gh);
            best_split_at(&pack[..], total, params)
                .map(|(gain, b)| Split {
                    gain,
                    feature: j,
                    threshold: bin.threshold(b),
                })
        })
        .reduce_with(|a, b| {
            if b.gain > a.gain || (b.gain == a.gain && b.feature < a.feature) {
                b
            } else {
                a
            }
        })
}


/// this code is implemented based on Algorithm 3 of the following paper:
/// Tianqi Chen and Carlos Guestrin.
/// XGBoost: A scalable tree boosting system [KDD '16]
///
/// Returns the gain and the last bin of the left child.
fn best_split_at(
    pack: &[BinStat],
    total: BinStat,
    params: &TreeParams,
) -> Option<(f64, usize)>
{
    let lambda = params.lambda_l2;
    let score = |s: &BinStat| s.grad.powi(2) / (s.hess + lambda);
    let parent = score(&total);

    let mut left = BinStat::default();
    let mut best: Option<(f64, usize)> = None;
    for (b, stat) in pack.iter().enumerate().take(pack.len().saturating_sub(1)) {
        left = left + *stat;
        let right = total - left;

        if left.count == 0 || right.count == 0 {
            continue;
        }
        if left.hess < params.min_child_weight
            || right.hess < params.min_child_weight
        {
            continue;
        }

        let gain = 0.5 * (score(&left) + score(&right) - parent) - params.gamma;
        if best.map_or(true, |(g, _)| gain > g) {
            best = Some((gain, b));
        }
    }

    best.filter(|(gain, _)| *gain > 0.0)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{LossFunction, Objective};
    use crate::sample::Feature;
    use crate::{Regressor, RegressionTreeBuilder};

    fn step_sample() -> Sample {
        let noise = Feature::from_values("noise", vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        let signal = Feature::from_values("signal", vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        Sample::from_columns(vec![noise, signal], y).unwrap()
    }

    #[test]
    fn a_stump_finds_the_signal() {
        let sample = step_sample();
        let tree = RegressionTreeBuilder::new(&sample)
            .max_depth(1)
            .lambda_l2(0.0)
            .build();
        let gh = Objective::Regression.gradient_hessian(&[0.0; 6], sample.target());
        let f = tree.produce(&sample, &gh);

        assert_eq!(f.depth(), 1);
        assert_eq!(f.predict_all(&sample), sample.target().to_vec());
    }

    #[test]
    fn min_child_weight_blocks_small_children() {
        let sample = step_sample();
        let tree = RegressionTreeBuilder::new(&sample)
            .max_depth(3)
            .min_child_weight(4.0)
            .build();
        let gh = Objective::Regression.gradient_hessian(&[0.0; 6], sample.target());
        let f = tree.produce(&sample, &gh);
        assert_eq!(f.n_leaves(), 1);
    }

    #[test]
    fn gamma_prunes_weak_splits() {
        let sample = step_sample();
        let tree = RegressionTreeBuilder::new(&sample)
            .max_depth(2)
            .lambda_l2(0.0)
            .gamma(10.0)
            .build();
        let gh = Objective::Regression.gradient_hessian(&[0.0; 6], sample.target());
        assert_eq!(tree.produce(&sample, &gh).depth(), 0);
    }

    #[test]
    fn equal_gains_prefer_the_first_feature() {
        let a = Feature::from_values("a", vec![0.0, 0.0, 1.0, 1.0]);
        let b = Feature::from_values("b", vec![0.0, 0.0, 1.0, 1.0]);
        let sample = Sample::from_columns(vec![a, b], vec![0.0, 0.0, 1.0, 1.0])
            .unwrap();
        let tree = RegressionTreeBuilder::new(&sample).max_depth(1).build();
        let gh = Objective::Regression.gradient_hessian(&[0.0; 4], sample.target());
        let f = tree.produce(&sample, &gh);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.dot");
        f.to_dot_file(&path).unwrap();
        let dot = std::fs::read_to_string(&path).unwrap();
        assert!(dot.contains("x0 < 0.50"));
    }

    #[test]
    fn column_sampling_is_reproducible() {
        let sample = step_sample();
        let build = || RegressionTreeBuilder::new(&sample)
            .max_depth(2)
            .colsample(0.5)
            .subsample(0.5)
            .seed(11)
            .build();
        let gh = Objective::Regression.gradient_hessian(&[0.0; 6], sample.target());
        let (t1, t2) = (build(), build());
        for _ in 0..3 {
            assert_eq!(t1.produce(&sample, &gh), t2.produce(&sample, &gh));
        }
        assert!(Objective::Regression.eval(&[0.0; 6], sample.target()) > 0.0);
    }
}
