//! Models trained directly on fingerprint features.
use std::sync::Arc;

use crate::Sample;
use crate::data::DataBundle;
use crate::error::Result;
use crate::metric::EvalMetric;
use super::handle::{ModelHandle, ModelState};
use super::model_kind::ModelKind;
use super::params::{BoosterParams, ModelConfig};
use super::trained_booster::TrainedBooster;


/// A first-layer model.
///
/// The lifecycle is
/// `Unconfigured -> Configured -> CrossValidated -> HoldoutGenerated`.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use vsboosts::prelude::*;
/// # fn bundle() -> DataBundle { unimplemented!() }
///
/// let bundle = Arc::new(bundle());
/// let mut model = FirstLayerModel::new(
///     "layer1_data0_binary_GbtreeLogistic_ROCAUC",
///     bundle,
///     ModelKind::GBTREE_LOGISTIC,
///     EvalMetric::RocAuc,
/// );
/// let (mean, std) = model.cross_validate().unwrap();
/// let holdout = model.generate_holdout_pred().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FirstLayerModel {
    handle: ModelHandle,
}


impl FirstLayerModel {
    /// Construct an unconfigured model on `bundle`.
    pub fn new<S: ToString>(
        name: S,
        bundle: Arc<DataBundle>,
        kind: ModelKind,
        eval_metric: EvalMetric,
    ) -> Self
    {
        Self { handle: ModelHandle::new(name, bundle, kind, eval_metric) }
    }


    /// The default `(params, maximize, early_stopping_rounds)`.
    pub fn default_params(&self) -> (BoosterParams, bool, usize) {
        self.handle.default_params()
    }


    /// Set the parameters.
    pub fn configure(
        &mut self,
        params: BoosterParams,
        eval_metric: EvalMetric,
        maximize: bool,
        early_stopping_rounds: usize,
    ) -> Result<()>
    {
        self.handle.configure(ModelConfig {
            params, eval_metric, maximize, early_stopping_rounds,
        })
    }


    /// Train one booster per fold.
    /// See [`ModelHandle::cross_validate`].
    pub fn cross_validate(&mut self) -> Result<(f64, f64)> {
        self.handle.cross_validate()
    }


    /// Out-of-fold predictions in training order.
    pub fn generate_holdout_pred(&mut self) -> Result<&[f64]> {
        self.handle.generate_holdout_pred()
    }


    /// Mean prediction of the fold boosters.
    pub fn predict(&self, sample: &Sample) -> Result<Vec<f64>> {
        self.handle.predict(sample)
    }


    /// Predictions on the test split.
    pub fn predict_test(&self) -> Result<Vec<f64>> {
        self.handle.predict_test()
    }


    /// Returns the name.
    pub fn name(&self) -> &str {
        self.handle.name()
    }


    /// Returns the model kind.
    pub fn kind(&self) -> ModelKind {
        self.handle.kind()
    }


    /// Returns the eval metric.
    pub fn eval_metric(&self) -> EvalMetric {
        self.handle.eval_metric()
    }


    /// Returns the cross-validation `(mean, std)`.
    pub fn cv_score(&self) -> Option<(f64, f64)> {
        self.handle.cv_score()
    }


    /// Returns the best validation score of every fold.
    pub fn fold_scores(&self) -> &[f64] {
        self.handle.fold_scores()
    }


    /// Returns the number of rounds kept in every fold.
    pub fn best_rounds(&self) -> &[usize] {
        self.handle.best_rounds()
    }


    /// Returns the holdout predictions, if generated.
    pub fn holdout(&self) -> Option<&[f64]> {
        self.handle.holdout()
    }


    /// Returns the lifecycle state.
    pub fn state(&self) -> ModelState {
        self.handle.state()
    }


    /// Returns the data bundle.
    pub fn bundle(&self) -> &Arc<DataBundle> {
        self.handle.bundle()
    }


    /// Returns the booster of every fold.
    pub fn boosters(&self) -> &[TrainedBooster] {
        self.handle.boosters()
    }
}
