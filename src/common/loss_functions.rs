use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use std::fmt;

use super::utils::sigmoid;


// Lower bound of the logistic hessian.
const MIN_HESSIAN: f64 = 1e-16;


/// The first and second derivative of the loss at one example.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GradientHessian {
    /// First derivative.
    pub grad: f64,
    /// Second derivative.
    pub hess: f64,
}


impl GradientHessian {
    /// Construct a new pair.
    #[inline]
    pub fn new(grad: f64, hess: f64) -> Self {
        Self { grad, hess }
    }
}


/// This trait defines the loss functions
/// minimized by the gradient boosting machine.
/// Predictions are raw margins;
/// [`LossFunction::transform`] maps them to the output scale.
pub trait LossFunction {
    /// The name of the loss function.
    fn name(&self) -> &str;


    /// Loss value for a single point.
    fn eval_at_point(&self, prediction: f64, true_value: f64) -> f64;


    /// Mean loss value over the points.
    fn eval(&self, predictions: &[f64], target: &[f64]) -> f64 {
        let n_items = predictions.len();
        debug_assert_eq!(n_items, target.len());
        if n_items == 0 {
            return 0.0;
        }

        predictions.iter()
            .zip(target)
            .map(|(&p, &y)| self.eval_at_point(p, y))
            .sum::<f64>()
            / n_items as f64
    }


    /// Gradient and diagonal Hessian at the current predictions.
    fn gradient_hessian(&self, predictions: &[f64], target: &[f64])
        -> Vec<GradientHessian>;


    /// Map a raw margin to the output scale.
    fn transform(&self, raw: f64) -> f64 {
        raw
    }


    /// The raw margin every model starts from.
    fn base_score(&self, target: &[f64]) -> f64;
}


/// The training objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Objective {
    /// Logistic loss for labels in `{0, 1}`.
    /// The output is a probability.
    Logistic,
    /// Squared error.
    Regression,
}


impl LossFunction for Objective {
    fn name(&self) -> &str {
        match self {
            Self::Logistic => "binary:logistic",
            Self::Regression => "reg:squarederror",
        }
    }


    fn eval_at_point(&self, prediction: f64, true_value: f64) -> f64 {
        match self {
            Self::Logistic => {
                // log(1 + e^f) - y f, written to avoid overflow.
                let f = prediction;
                f.max(0.0) + (-f.abs()).exp().ln_1p() - true_value * f
            },
            Self::Regression => 0.5 * (prediction - true_value).powi(2),
        }
    }


    fn gradient_hessian(&self, predictions: &[f64], target: &[f64])
        -> Vec<GradientHessian>
    {
        debug_assert_eq!(predictions.len(), target.len());
        predictions.par_iter()
            .zip(target)
            .map(|(&f, &y)| match self {
                Self::Logistic => {
                    let p = sigmoid(f);
                    GradientHessian::new(p - y, (p * (1.0 - p)).max(MIN_HESSIAN))
                },
                Self::Regression => GradientHessian::new(f - y, 1.0),
            })
            .collect()
    }


    fn transform(&self, raw: f64) -> f64 {
        match self {
            Self::Logistic => sigmoid(raw),
            Self::Regression => raw,
        }
    }


    fn base_score(&self, target: &[f64]) -> f64 {
        match self {
            Self::Logistic => 0.0,
            Self::Regression => {
                if target.is_empty() {
                    0.0
                } else {
                    target.iter().sum::<f64>() / target.len() as f64
                }
            },
        }
    }
}


impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_derivatives_at_zero() {
        let gh = Objective::Logistic.gradient_hessian(&[0.0, 0.0], &[1.0, 0.0]);
        assert_eq!(gh[0], GradientHessian::new(-0.5, 0.25));
        assert_eq!(gh[1], GradientHessian::new(0.5, 0.25));
    }

    #[test]
    fn logistic_loss_is_stable() {
        let loss = Objective::Logistic.eval_at_point(1000.0, 0.0);
        assert!((loss - 1000.0).abs() < 1e-9);
        let loss = Objective::Logistic.eval_at_point(0.0, 1.0);
        assert!((loss - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn squared_error_starts_from_the_mean() {
        assert_eq!(Objective::Regression.base_score(&[1.0, 2.0, 6.0]), 3.0);
        let gh = Objective::Regression.gradient_hessian(&[3.0], &[1.0]);
        assert_eq!(gh[0], GradientHessian::new(2.0, 1.0));
    }
}
