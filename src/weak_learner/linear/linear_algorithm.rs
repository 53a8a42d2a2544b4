use rayon::prelude::*;

use crate::{
    common::{utils::soft_threshold, GradientHessian},
    Sample,
    WeakLearner,
};
use super::linear_regressor::LinearRegressor;


/// Default L2-regularization parameter.
pub const DEFAULT_LAMBDA_L2: f64 = 1.0;
/// Default L1-regularization parameter.
pub const DEFAULT_ALPHA_L1: f64 = 0.0;


/// `LinearLearner` is the factory that generates a [`LinearRegressor`]
/// by one pass of coordinate descent over the features.
///
/// The intercept is updated first with the Newton step `-G / H`.
/// Then, for every feature `j` in column order,
/// ```text
/// w_j = soft_threshold(-G_j, alpha) / (H_j + lambda)
/// ```
/// where `G_j` and `H_j` are the derivative sums weighted by `x_j`
/// (resp. `x_j^2`), and the gradients are refreshed after each update.
/// Features that are zero on every example are skipped.
///
/// # Example
/// ```no_run
/// use vsboosts::prelude::*;
/// let weak_learner = LinearLearner::new()
///     .lambda_l2(1.0)
///     .alpha_l1(0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearLearner {
    lambda_l2: f64,
    alpha_l1: f64,
}


impl Default for LinearLearner {
    fn default() -> Self {
        Self::new()
    }
}


impl LinearLearner {
    /// Construct a new instance of `LinearLearner`.
    pub fn new() -> Self {
        Self { lambda_l2: DEFAULT_LAMBDA_L2, alpha_l1: DEFAULT_ALPHA_L1, }
    }


    /// Set the L2-regularization parameter.
    /// Default value is `1.0`.
    pub fn lambda_l2(mut self, lambda_l2: f64) -> Self {
        self.lambda_l2 = lambda_l2;
        self
    }


    /// Set the L1-regularization parameter.
    /// Default value is `0.0`.
    pub fn alpha_l1(mut self, alpha_l1: f64) -> Self {
        self.alpha_l1 = alpha_l1;
        self
    }
}


impl WeakLearner for LinearLearner {
    type Hypothesis = LinearRegressor;


    fn name(&self) -> &str {
        "Linear (coordinate descent)"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = Vec::from([
            ("L2 regularization", format!("{}", self.lambda_l2)),
            ("L1 regularization", format!("{}", self.alpha_l1)),
        ]);
        Some(info)
    }


    fn produce(&self, sample: &Sample, gh: &[GradientHessian])
        -> Self::Hypothesis
    {
        let mut grad = gh.iter().map(|x| x.grad).collect::<Vec<_>>();
        let hess = gh.iter().map(|x| x.hess).collect::<Vec<_>>();

        let hess_sum = hess.iter().sum::<f64>();
        let bias = if hess_sum > 0.0 {
            - grad.iter().sum::<f64>() / hess_sum
        } else {
            0.0
        };
        grad.par_iter_mut()
            .zip(&hess[..])
            .for_each(|(g, h)| { *g += h * bias; });

        let mut weights = Vec::new();
        for (j, feature) in sample.features().iter().enumerate() {
            let x = feature.values();
            let (g_j, h_j) = x.par_iter()
                .zip(&grad[..])
                .zip(&hess[..])
                .map(|((&xi, &gi), &hi)| (gi * xi, hi * xi * xi))
                .reduce(|| (0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1));

            if h_j <= 0.0 {
                continue;
            }
            let w = soft_threshold(-g_j, self.alpha_l1) / (h_j + self.lambda_l2);
            if w == 0.0 || !w.is_finite() {
                continue;
            }
            weights.push((j, w));

            grad.par_iter_mut()
                .zip(x)
                .zip(&hess[..])
                .for_each(|((g, &xi), &hi)| { *g += hi * xi * w; });
        }

        LinearRegressor { bias, weights }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{LossFunction, Objective};
    use crate::sample::Feature;
    use crate::Regressor;

    fn line() -> Sample {
        let x = Feature::from_values("x", vec![0.0, 1.0, 2.0, 3.0]);
        let zero = Feature::from_values("zero", vec![0.0; 4]);
        Sample::from_columns(vec![x, zero], vec![1.0, 3.0, 5.0, 7.0]).unwrap()
    }

    #[test]
    fn one_pass_reduces_the_loss() {
        let sample = line();
        let start = vec![0.0; 4];
        let gh = Objective::Regression.gradient_hessian(&start, sample.target());
        let f = LinearLearner::new().lambda_l2(0.0).produce(&sample, &gh);

        assert_eq!(f.bias, 4.0);
        assert_eq!(f.weights.len(), 1);
        assert_eq!(f.weights[0].0, 0);
        assert!((f.weights[0].1 - 10.0 / 14.0).abs() < 1e-12);

        let after = f.predict_all(&sample);
        let obj = Objective::Regression;
        assert!(obj.eval(&after, sample.target()) < obj.eval(&start, sample.target()));
    }

    #[test]
    fn strong_l1_zeroes_every_weight() {
        let sample = line();
        let gh = Objective::Regression.gradient_hessian(&[0.0; 4], sample.target());
        let f = LinearLearner::new().alpha_l1(100.0).produce(&sample, &gh);
        assert!(f.weights.is_empty());
    }
}
