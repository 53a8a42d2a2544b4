//! Hyperparameters of a boosted model.
use serde::{Serialize, Deserialize};

use crate::error::{Result, ScreeningError};
use crate::metric::EvalMetric;
use super::model_kind::{BaseLearner, ModelKind};


/// Default number of rounds without improvement before stopping.
pub const DEFAULT_EARLY_STOPPING_ROUNDS: usize = 30;
/// Default maximal number of boosting rounds.
pub const DEFAULT_N_ROUNDS: usize = 300;


/// Hyperparameters of the booster and its weak learner.
/// Tree-only parameters are ignored by linear models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    /// Shrinkage of every round.
    pub learning_rate: f64,
    /// Maximal number of boosting rounds.
    pub n_rounds: usize,
    /// Maximal depth of a tree.
    pub max_depth: usize,
    /// L2 regularization.
    pub lambda_l2: f64,
    /// L1 regularization (linear models).
    pub alpha_l1: f64,
    /// Minimal split gain (trees).
    pub gamma: f64,
    /// Minimal Hessian sum of a child (trees).
    pub min_child_weight: f64,
    /// Row subsampling ratio per tree.
    pub subsample: f64,
    /// Column subsampling ratio per tree.
    pub colsample: f64,
    /// Seed of the subsampling.
    pub seed: u64,
}


impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            n_rounds: DEFAULT_N_ROUNDS,
            max_depth: 4,
            lambda_l2: 1.0,
            alpha_l1: 0.0,
            gamma: 0.0,
            min_child_weight: 1.0,
            subsample: 1.0,
            colsample: 1.0,
            seed: 0,
        }
    }
}


impl BoosterParams {
    /// The default parameters of `kind`.
    pub fn default_for(kind: ModelKind) -> Self {
        match kind.learner {
            BaseLearner::Tree => Self::default(),
            BaseLearner::Linear => Self { learning_rate: 0.5, ..Self::default() },
        }
    }


    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, value: String| Err(ScreeningError::Config(
            format!("invalid booster parameter `{key}`: {value}")
        ));

        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid("learning_rate", self.learning_rate.to_string());
        }
        if self.n_rounds == 0 {
            return invalid("n_rounds", "0".into());
        }
        for (key, value) in [
            ("lambda_l2", self.lambda_l2),
            ("alpha_l1", self.alpha_l1),
            ("gamma", self.gamma),
            ("min_child_weight", self.min_child_weight),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return invalid(key, value.to_string());
            }
        }
        for (key, value) in [
            ("subsample", self.subsample),
            ("colsample", self.colsample),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return invalid(key, value.to_string());
            }
        }
        Ok(())
    }
}


/// Everything `configure` sets on a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Booster hyperparameters.
    pub params: BoosterParams,
    /// Metric evaluated on the validation split of every fold.
    pub eval_metric: EvalMetric,
    /// Whether a larger metric value is better.
    pub maximize: bool,
    /// Rounds without improvement before a fold stops.
    pub early_stopping_rounds: usize,
}


impl ModelConfig {
    /// The default configuration of `kind` monitored with `eval_metric`.
    pub fn default_for(kind: ModelKind, eval_metric: EvalMetric) -> Self {
        Self {
            params: BoosterParams::default_for(kind),
            eval_metric,
            maximize: eval_metric.is_maximize(),
            early_stopping_rounds: DEFAULT_EARLY_STOPPING_ROUNDS,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_defaults_use_a_larger_step() {
        let p = BoosterParams::default_for(ModelKind::GBLINEAR_LOGISTIC);
        assert_eq!(p.learning_rate, 0.5);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn out_of_range_values_are_config_errors() {
        let p = BoosterParams { subsample: 0.0, ..BoosterParams::default() };
        assert!(matches!(p.validate(), Err(ScreeningError::Config(_))));
        let p = BoosterParams { n_rounds: 0, ..BoosterParams::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p: BoosterParams = serde_json::from_str(r#"{"max_depth": 6}"#).unwrap();
        assert_eq!(p.max_depth, 6);
        assert_eq!(p.n_rounds, DEFAULT_N_ROUNDS);
    }
}
