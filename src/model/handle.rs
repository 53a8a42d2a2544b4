//! Cross-validated model shared by both layers.
use rayon::prelude::*;
use tracing::{debug, info};

use std::sync::Arc;

use crate::{Regressor, Sample};
use crate::common::utils::mean_and_std;
use crate::data::DataBundle;
use crate::error::{Result, ScreeningError};
use crate::metric::EvalMetric;
use super::model_kind::ModelKind;
use super::params::{BoosterParams, ModelConfig};
use super::trained_booster::{fit_fold, TrainedBooster};


/// The lifecycle of a model.
/// Each operation requires the states before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModelState {
    /// Created, no parameters set.
    Unconfigured,
    /// Parameters set.
    Configured,
    /// One booster trained per fold.
    CrossValidated,
    /// Out-of-fold predictions available.
    HoldoutGenerated,
}


/// A model trained once per cross-validation fold of a [`DataBundle`].
#[derive(Debug, Clone)]
pub struct ModelHandle {
    name: String,
    bundle: Arc<DataBundle>,
    kind: ModelKind,
    config: ModelConfig,
    state: ModelState,
    boosters: Vec<TrainedBooster>,
    fold_scores: Vec<f64>,
    best_rounds: Vec<usize>,
    cv_score: Option<(f64, f64)>,
    holdout: Option<Vec<f64>>,
    test_predictions: Option<Vec<f64>>,
}


impl ModelHandle {
    /// Construct an unconfigured model.
    pub fn new<S: ToString>(
        name: S,
        bundle: Arc<DataBundle>,
        kind: ModelKind,
        eval_metric: EvalMetric,
    ) -> Self
    {
        Self {
            name: name.to_string(),
            bundle,
            kind,
            config: ModelConfig::default_for(kind, eval_metric),
            state: ModelState::Unconfigured,
            boosters: Vec::new(),
            fold_scores: Vec::new(),
            best_rounds: Vec::new(),
            cv_score: None,
            holdout: None,
            test_predictions: None,
        }
    }


    /// The default `(params, maximize, early_stopping_rounds)` of this model.
    pub fn default_params(&self) -> (BoosterParams, bool, usize) {
        let config = ModelConfig::default_for(self.kind, self.config.eval_metric);
        (config.params, config.maximize, config.early_stopping_rounds)
    }


    /// Set the parameters.
    /// Any trained state is discarded.
    pub fn configure(&mut self, config: ModelConfig) -> Result<()> {
        validate_config(&config)?;
        self.config = config;
        self.state = ModelState::Configured;
        self.boosters.clear();
        self.fold_scores.clear();
        self.best_rounds.clear();
        self.cv_score = None;
        self.holdout = None;
        self.test_predictions = None;
        Ok(())
    }


    /// Train one booster per fold, in parallel,
    /// and return the mean and the standard deviation
    /// of the best validation scores.
    pub fn cross_validate(&mut self) -> Result<(f64, f64)> {
        if self.state == ModelState::Unconfigured {
            let default = ModelConfig::default_for(self.kind, self.config.eval_metric);
            self.configure(default)?;
        }

        let bundle = &self.bundle;
        let config = &self.config;
        let kind = self.kind;
        let name = &self.name;
        let fits = (0..bundle.n_folds()).into_par_iter()
            .map(|i| {
                let fit = fit_fold(
                    kind,
                    config,
                    bundle.train_fold(i),
                    bundle.validation_fold(i),
                    i as u64,
                )
                .map_err(|e| match e {
                    ScreeningError::Training { reason, .. } => {
                        ScreeningError::training(name, format!("fold {i}: {reason}"))
                    },
                    other => other,
                })?;
                debug!(
                    model = %name,
                    fold = i,
                    best_round = fit.best_round,
                    score = fit.best_score,
                    "fold trained",
                );
                Ok(fit)
            })
            .collect::<Result<Vec<_>>>()?;

        self.fold_scores = fits.iter().map(|fit| fit.best_score).collect();
        self.best_rounds = fits.iter().map(|fit| fit.best_round).collect();
        self.boosters = fits.into_iter().map(|fit| fit.booster).collect();

        let cv_score = mean_and_std(&self.fold_scores[..]);
        self.cv_score = Some(cv_score);
        self.holdout = None;
        self.test_predictions = None;
        self.state = ModelState::CrossValidated;

        info!(
            model = %self.name,
            metric = %self.config.eval_metric,
            cv_mean = cv_score.0,
            cv_std = cv_score.1,
            "cross-validated",
        );
        Ok(cv_score)
    }


    /// Predict every validation split with the booster of its fold
    /// and scatter the predictions into training order.
    /// The test predictions are computed along the way.
    pub fn generate_holdout_pred(&mut self) -> Result<&[f64]> {
        if self.state < ModelState::CrossValidated {
            return Err(ScreeningError::State(format!(
                "`{}` must be cross-validated before generating holdout predictions",
                self.name,
            )));
        }

        if self.holdout.is_none() {
            let holdout = self.scatter_holdout()?;
            let test = self.predict(self.bundle.test())?;
            self.holdout = Some(holdout);
            self.test_predictions = Some(test);
            self.state = ModelState::HoldoutGenerated;
        }

        self.holdout.as_deref()
            .ok_or_else(|| ScreeningError::State(format!(
                "`{}` has no holdout predictions", self.name,
            )))
    }


    fn scatter_holdout(&self) -> Result<Vec<f64>> {
        let n_train = self.bundle.training().shape().0;
        let mut holdout = vec![None; n_train];

        for (i, booster) in self.boosters.iter().enumerate() {
            let predictions = booster.predict_all(self.bundle.validation_fold(i));
            let positions = self.bundle.validation_positions(i);
            for (&p, y) in positions.iter().zip(predictions) {
                if holdout[p].replace(y).is_some() {
                    return Err(ScreeningError::DataShape(format!(
                        "training example {p} is in more than one validation fold"
                    )));
                }
            }
        }

        holdout.into_iter()
            .enumerate()
            .map(|(p, y)| y.ok_or_else(|| ScreeningError::DataShape(format!(
                "training example {p} is in no validation fold"
            ))))
            .collect()
    }


    /// Mean prediction of the fold boosters.
    pub fn predict(&self, sample: &Sample) -> Result<Vec<f64>> {
        if self.state < ModelState::CrossValidated {
            return Err(ScreeningError::State(format!(
                "`{}` must be cross-validated before predicting", self.name,
            )));
        }
        let expected = self.bundle.training().shape().1;
        let n_feature = sample.shape().1;
        if n_feature != expected {
            return Err(ScreeningError::DataShape(format!(
                "`{}` expects {expected} features, got {n_feature}", self.name,
            )));
        }

        let predictions = self.boosters.par_iter()
            .map(|booster| booster.predict_all(sample))
            .collect::<Vec<_>>();

        let n_sample = sample.shape().0;
        let n_model = predictions.len() as f64;
        let mean = (0..n_sample)
            .map(|i| predictions.iter().map(|p| p[i]).sum::<f64>() / n_model)
            .collect();
        Ok(mean)
    }


    /// Predictions on the test split of the bundle.
    pub fn predict_test(&self) -> Result<Vec<f64>> {
        match &self.test_predictions {
            Some(predictions) => Ok(predictions.clone()),
            None => self.predict(self.bundle.test()),
        }
    }


    /// Returns the name.
    pub fn name(&self) -> &str {
        &self.name
    }


    /// Returns the model kind.
    pub fn kind(&self) -> ModelKind {
        self.kind
    }


    /// Returns the eval metric.
    pub fn eval_metric(&self) -> EvalMetric {
        self.config.eval_metric
    }


    /// Returns the current configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }


    /// Returns the cross-validation `(mean, std)`.
    pub fn cv_score(&self) -> Option<(f64, f64)> {
        self.cv_score
    }


    /// Returns the best validation score of every fold.
    pub fn fold_scores(&self) -> &[f64] {
        &self.fold_scores[..]
    }


    /// Returns the number of rounds kept in every fold.
    pub fn best_rounds(&self) -> &[usize] {
        &self.best_rounds[..]
    }


    /// Returns the holdout predictions, if generated.
    pub fn holdout(&self) -> Option<&[f64]> {
        self.holdout.as_deref()
    }


    /// Returns the lifecycle state.
    pub fn state(&self) -> ModelState {
        self.state
    }


    /// Returns the data the model is trained on.
    pub fn bundle(&self) -> &Arc<DataBundle> {
        &self.bundle
    }


    /// Returns the booster of every fold.
    pub fn boosters(&self) -> &[TrainedBooster] {
        &self.boosters[..]
    }
}


pub(crate) fn validate_config(config: &ModelConfig) -> Result<()> {
    config.params.validate()?;
    if config.early_stopping_rounds == 0 {
        return Err(ScreeningError::Config(
            "`early_stopping_rounds` must be positive".into()
        ));
    }
    Ok(())
}
