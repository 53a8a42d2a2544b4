//! One boosted model trained on one fold.
use serde::Serialize;

use crate::{
    AdditiveModel,
    Booster,
    GBM,
    LinearLearner,
    LinearRegressor,
    Regressor,
    RegressionTreeBuilder,
    RegressionTreeRegressor,
    Sample,
};
use crate::error::{Result, ScreeningError};
use super::model_kind::{BaseLearner, ModelKind};
use super::params::ModelConfig;


/// A boosted model of either base learner.
#[derive(Debug, Clone, Serialize)]
pub enum TrainedBooster {
    /// Boosted regression trees.
    Tree(AdditiveModel<RegressionTreeRegressor>),
    /// Boosted linear functions.
    Linear(AdditiveModel<LinearRegressor>),
}


impl TrainedBooster {
    /// Returns the number of boosting rounds kept.
    pub fn n_rounds(&self) -> usize {
        match self {
            Self::Tree(model) => model.len(),
            Self::Linear(model) => model.len(),
        }
    }
}


impl Regressor for TrainedBooster {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        match self {
            Self::Tree(model) => model.predict(sample, row),
            Self::Linear(model) => model.predict(sample, row),
        }
    }


    fn predict_all(&self, sample: &Sample) -> Vec<f64> {
        match self {
            Self::Tree(model) => model.predict_all(sample),
            Self::Linear(model) => model.predict_all(sample),
        }
    }
}


/// The outcome of boosting on one fold.
#[derive(Debug, Clone)]
pub(crate) struct FoldFit {
    pub(crate) booster: TrainedBooster,
    pub(crate) best_score: f64,
    pub(crate) best_round: usize,
}


fn gbm<'a, H>(
    kind: ModelKind,
    config: &ModelConfig,
    train: &'a Sample,
    valid: &'a Sample,
) -> GBM<'a, H>
{
    GBM::init_with_loss(train, kind.objective)
        .learning_rate(config.params.learning_rate)
        .max_iter(config.params.n_rounds)
        .validation(
            valid,
            config.eval_metric,
            config.maximize,
            config.early_stopping_rounds,
        )
}


/// Boost `kind` on `train`, monitored on `valid`.
/// `seed_offset` varies the subsampling between folds.
pub(crate) fn fit_fold(
    kind: ModelKind,
    config: &ModelConfig,
    train: &Sample,
    valid: &Sample,
    seed_offset: u64,
) -> Result<FoldFit>
{
    let params = &config.params;
    let (booster, best_score) = match kind.learner {
        BaseLearner::Tree => {
            let tree = RegressionTreeBuilder::new(train)
                .max_depth(params.max_depth)
                .lambda_l2(params.lambda_l2)
                .gamma(params.gamma)
                .min_child_weight(params.min_child_weight)
                .subsample(params.subsample)
                .colsample(params.colsample)
                .seed(params.seed.wrapping_add(seed_offset))
                .build();
            let result = gbm::<RegressionTreeRegressor>(kind, config, train, valid)
                .run(&tree)?;
            (TrainedBooster::Tree(result.model), result.best_score)
        },
        BaseLearner::Linear => {
            let linear = LinearLearner::new()
                .lambda_l2(params.lambda_l2)
                .alpha_l1(params.alpha_l1);
            let result = gbm::<LinearRegressor>(kind, config, train, valid)
                .run(&linear)?;
            (TrainedBooster::Linear(result.model), result.best_score)
        },
    };

    let best_score = best_score.ok_or_else(|| ScreeningError::training(
        kind, "no boosting round was run",
    ))?;
    let best_round = booster.n_rounds();
    Ok(FoldFit { booster, best_score, best_round })
}
