//! Meta models stacked on the holdout predictions of the first layer.
use std::sync::Arc;

use crate::Sample;
use crate::data::DataBundle;
use crate::error::{Result, ScreeningError};
use crate::metric::EvalMetric;
use crate::sample::Feature;
use super::first_layer::FirstLayerModel;
use super::handle::{validate_config, ModelHandle, ModelState};
use super::model_kind::ModelKind;
use super::params::{BoosterParams, ModelConfig};


#[derive(Debug, Clone)]
struct MetaInput {
    name: String,
    holdout: Vec<f64>,
    test: Vec<f64>,
}


/// A second-layer model.
///
/// Every first-layer model contributes one meta feature:
/// its holdout predictions for training
/// and its test predictions for testing.
/// The meta bundle reuses the folds and labels of `label_source`,
/// so no meta feature was ever fit on the example it describes.
#[derive(Debug, Clone)]
pub struct SecondLayerModel {
    name: String,
    label_source: Arc<DataBundle>,
    kind: ModelKind,
    eval_metric: EvalMetric,
    inputs: Vec<MetaInput>,
    pending: Option<ModelConfig>,
    handle: Option<ModelHandle>,
}


impl SecondLayerModel {
    /// Collect the holdout and test predictions of `first_layer`.
    /// Every model must have generated its holdout predictions
    /// on the fold layout of `label_source`.
    pub fn new<S: ToString>(
        name: S,
        label_source: Arc<DataBundle>,
        first_layer: &[FirstLayerModel],
        kind: ModelKind,
        eval_metric: EvalMetric,
    ) -> Result<Self>
    {
        let name = name.to_string();
        if first_layer.is_empty() {
            return Err(ScreeningError::DataShape(format!(
                "`{name}` has no first-layer model to stack"
            )));
        }

        let n_test = label_source.test().shape().0;
        let inputs = first_layer.iter()
            .map(|model| {
                let holdout = model.holdout()
                    .ok_or_else(|| ScreeningError::State(format!(
                        "`{}` has no holdout predictions", model.name(),
                    )))?;
                if model.bundle().layout() != label_source.layout() {
                    return Err(ScreeningError::DataShape(format!(
                        "`{}` was trained on a different fold layout",
                        model.name(),
                    )));
                }
                let test = model.predict_test()?;
                if test.len() != n_test {
                    return Err(ScreeningError::DataShape(format!(
                        "`{}` predicts {} test examples, expected {n_test}",
                        model.name(), test.len(),
                    )));
                }
                Ok(MetaInput {
                    name: model.name().to_string(),
                    holdout: holdout.to_vec(),
                    test,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            label_source,
            kind,
            eval_metric,
            inputs,
            pending: None,
            handle: None,
        })
    }


    /// Build the meta bundle.
    /// Column `j` holds the predictions of the `j`-th first-layer model.
    pub fn assemble_training_data(&mut self) -> Result<&DataBundle> {
        let train = self.inputs.iter()
            .map(|input| Feature::from_values(&input.name, input.holdout.clone()))
            .collect::<Vec<_>>();
        let test = self.inputs.iter()
            .map(|input| Feature::from_values(&input.name, input.test.clone()))
            .collect::<Vec<_>>();

        let source = &self.label_source;
        let train = Sample::from_columns(train, source.training_labels().to_vec())?;
        let test = Sample::from_columns(test, source.test_labels().to_vec())?;
        let bundle = DataBundle::from_layout(
            source.layout(), source.training_rows(), train, test,
        )?;

        let mut handle = ModelHandle::new(
            &self.name, Arc::new(bundle), self.kind, self.eval_metric,
        );
        if let Some(config) = self.pending.take() {
            handle.configure(config)?;
        }
        let handle = self.handle.insert(handle);
        Ok(handle.bundle().as_ref())
    }


    /// The default `(params, maximize, early_stopping_rounds)`.
    pub fn default_params(&self) -> (BoosterParams, bool, usize) {
        let config = ModelConfig::default_for(self.kind, self.eval_metric);
        (config.params, config.maximize, config.early_stopping_rounds)
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
        let config = ModelConfig {
            params, eval_metric, maximize, early_stopping_rounds,
        };
        self.eval_metric = eval_metric;
        match self.handle.as_mut() {
            Some(handle) => handle.configure(config),
            None => {
                validate_config(&config)?;
                self.pending = Some(config);
                Ok(())
            },
        }
    }


    /// Train one meta booster per fold.
    /// The meta bundle is assembled first if needed.
    pub fn cross_validate(&mut self) -> Result<(f64, f64)> {
        if self.handle.is_none() {
            self.assemble_training_data()?;
        }
        self.handle_mut()?.cross_validate()
    }


    /// Out-of-fold predictions of the meta model.
    pub fn generate_holdout_pred(&mut self) -> Result<&[f64]> {
        self.handle_mut()?.generate_holdout_pred()
    }


    /// Predict from first-layer predictions,
    /// one vector per first-layer model in construction order.
    pub fn predict(&self, first_layer_predictions: &[Vec<f64>]) -> Result<Vec<f64>> {
        let handle = self.handle()?;
        if first_layer_predictions.len() != self.inputs.len() {
            return Err(ScreeningError::DataShape(format!(
                "`{}` stacks {} models, got {} prediction vectors",
                self.name, self.inputs.len(), first_layer_predictions.len(),
            )));
        }
        let columns = self.inputs.iter()
            .zip(first_layer_predictions)
            .map(|(input, predictions)| {
                Feature::from_values(&input.name, predictions.clone())
            })
            .collect::<Vec<_>>();
        let sample = Sample::from_columns(columns, Vec::new())?;
        handle.predict(&sample)
    }


    /// Predictions on the meta test split.
    pub fn predict_test(&self) -> Result<Vec<f64>> {
        self.handle()?.predict_test()
    }


    fn handle(&self) -> Result<&ModelHandle> {
        self.handle.as_ref()
            .ok_or_else(|| ScreeningError::State(format!(
                "`{}` has not assembled its training data", self.name,
            )))
    }


    fn handle_mut(&mut self) -> Result<&mut ModelHandle> {
        let name = &self.name;
        self.handle.as_mut()
            .ok_or_else(|| ScreeningError::State(format!(
                "`{name}` has not assembled its training data",
            )))
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
        self.eval_metric
    }


    /// Returns the names of the stacked first-layer models.
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|input| input.name.as_str()).collect()
    }


    /// Returns the meta bundle, once assembled.
    pub fn meta_bundle(&self) -> Option<&DataBundle> {
        self.handle.as_ref().map(|handle| handle.bundle().as_ref())
    }


    /// Returns the cross-validation `(mean, std)`.
    pub fn cv_score(&self) -> Option<(f64, f64)> {
        self.handle.as_ref().and_then(|handle| handle.cv_score())
    }


    /// Returns the best validation score of every fold.
    pub fn fold_scores(&self) -> &[f64] {
        self.handle.as_ref().map(|handle| handle.fold_scores()).unwrap_or(&[])
    }


    /// Returns the number of rounds kept in every fold.
    pub fn best_rounds(&self) -> &[usize] {
        self.handle.as_ref().map(|handle| handle.best_rounds()).unwrap_or(&[])
    }


    /// Returns the holdout predictions, if generated.
    pub fn holdout(&self) -> Option<&[f64]> {
        self.handle.as_ref().and_then(|handle| handle.holdout())
    }


    /// Returns the lifecycle state.
    pub fn state(&self) -> ModelState {
        match (&self.handle, &self.pending) {
            (Some(handle), _) => handle.state(),
            (None, Some(_)) => ModelState::Configured,
            (None, None) => ModelState::Unconfigured,
        }
    }
}
