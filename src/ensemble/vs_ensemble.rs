//! The stacked ensemble.
use tracing::{info, warn};

use std::sync::Arc;

use crate::Sample;
use crate::data::{DataBundle, LabelKind, OuterSplit};
use crate::error::{Result, ScreeningError};
use crate::fold::{FoldAssignment, FoldGenerator};
use crate::metric::EvalMetric;
use crate::model::{FirstLayerModel, ModelKind, SecondLayerModel};
use crate::research::summary;
use crate::sample::check_binary;
use super::ensemble_config::EnsembleConfig;
use super::labeled_features::LabeledFeatures;
use super::result_collector::{EnsembleRecord, ResultCollector};


const ENSEMBLE: &str = "ensemble";
const LAYER2_KINDS: [ModelKind; 2] = [
    ModelKind::GBTREE_LOGISTIC,
    ModelKind::GBLINEAR_LOGISTIC,
];


/// One `(input, label)` pair and its folds.
#[derive(Debug, Clone)]
struct BundleSetting {
    input: usize,
    data_name: String,
    bundle: Arc<DataBundle>,
}


impl BundleSetting {
    fn kinds(&self) -> [ModelKind; 2] {
        match self.bundle.label_kind() {
            LabelKind::Binary => [
                ModelKind::GBTREE_LOGISTIC,
                ModelKind::GBLINEAR_LOGISTIC,
            ],
            LabelKind::Continuous => [
                ModelKind::GBTREE_REGRESSION,
                ModelKind::GBLINEAR_REGRESSION,
            ],
        }
    }
}


/// A two-layer stacked ensemble for virtual screening.
///
/// Every `(input, label)` pair gets two first-layer models.
/// Their holdout predictions are the features
/// of the second-layer models.
/// All models share one fold assignment,
/// generated from the primary label.
///
/// # Example
/// ```no_run
/// use vsboosts::prelude::*;
/// # let sample = Sample::from_columns(vec![], vec![]).unwrap();
/// # let labels = vec![];
///
/// let input = LabeledFeatures::new("morgan", sample)
///     .label("active", labels);
/// let config = EnsembleConfig::new(EvalMetric::RocAuc).seed(2016);
/// let mut ensemble = VsEnsemble::new(vec![input], config).unwrap();
/// ensemble.train().unwrap();
/// println!("{:?}", ensemble.training_result().unwrap());
/// ```
#[derive(Debug)]
pub struct VsEnsemble {
    inputs: Vec<LabeledFeatures>,
    config: EnsembleConfig,
    folds: FoldAssignment,
    settings: Vec<BundleSetting>,
    layer1: Vec<FirstLayerModel>,
    layer1_inputs: Vec<usize>,
    layer2: Vec<SecondLayerModel>,
    result: Option<ResultCollector>,
}


impl VsEnsemble {
    /// Validate the inputs and build the folds of every `(input, label)`.
    pub fn new(inputs: Vec<LabeledFeatures>, config: EnsembleConfig)
        -> Result<Self>
    {
        let Some(first) = inputs.first() else {
            return Err(ScreeningError::DataShape("no input feature set".into()));
        };
        for input in &inputs {
            input.validate()?;
        }
        let n_rows = first.n_rows();
        if let Some(input) = inputs.iter().find(|input| input.n_rows() != n_rows) {
            return Err(ScreeningError::DataShape(format!(
                "`{}` has {} rows, `{}` has {n_rows}",
                input.name, input.n_rows(), first.name,
            )));
        }

        let primary = &first.labels[0].1;
        check_binary(primary)?;

        let folds = match &config.fold_assignment {
            Some(folds) => {
                if folds.len() != n_rows {
                    return Err(ScreeningError::DataShape(format!(
                        "the fold assignment covers {} rows, the inputs have {n_rows}",
                        folds.len(),
                    )));
                }
                folds.clone()
            },
            None => FoldGenerator::new(config.n_folds)
                .seed(config.seed)
                .verbose(config.verbose)
                .generate(primary)?,
        };

        if let Some(tests) = &config.external_test {
            if tests.len() != inputs.len() {
                return Err(ScreeningError::DataShape(format!(
                    "{} external test sets for {} inputs",
                    tests.len(), inputs.len(),
                )));
            }
        }

        let mut settings = Vec::new();
        for (i, input) in inputs.iter().enumerate() {
            for (label, values) in &input.labels {
                let sample = input.features.clone()
                    .with_target(values.clone())?;
                let outer = match &config.external_test {
                    Some(tests) => OuterSplit::External(tests[i].clone()),
                    None => OuterSplit::HeldOutFolds(config.held_out_folds),
                };
                let bundle = DataBundle::build(&folds, sample, outer)?;
                let data_name = format!(
                    "data{}_{}", settings.len() + 1, bundle.label_kind().name(),
                );
                info!(
                    input = %input.name,
                    label = %label,
                    data = %data_name,
                    "prepared data bundle",
                );
                settings.push(BundleSetting {
                    input: i,
                    data_name,
                    bundle: Arc::new(bundle),
                });
            }
        }

        Ok(Self {
            inputs,
            config,
            folds,
            settings,
            layer1: Vec::new(),
            layer1_inputs: Vec::new(),
            layer2: Vec::new(),
            result: None,
        })
    }


    /// Train both layers, score every model on the test split,
    /// and select the best one.
    pub fn train(&mut self) -> Result<ResultCollector> {
        self.layer1.clear();
        self.layer1_inputs.clear();
        self.layer2.clear();
        self.result = None;

        self.train_first_layer()?;
        self.train_second_layer()?;

        let result = self.score()?;
        if self.config.verbose {
            summary::print_summary(&result, self.config.eval_metric);
        }
        self.result = Some(result.clone());
        Ok(result)
    }


    fn train_first_layer(&mut self) -> Result<()> {
        let eval_metric = self.config.eval_metric;
        for setting in &self.settings {
            for kind in setting.kinds() {
                let metric = if kind.is_classifier() {
                    eval_metric
                } else {
                    EvalMetric::Rmse
                };
                let name = format!("layer1_{}_{kind}_{metric}", setting.data_name);
                let mut model = FirstLayerModel::new(
                    &name, setting.bundle.clone(), kind, metric,
                );
                let (mut params, maximize, rounds) = model.default_params();
                params.seed = self.config.seed;
                model.configure(params, metric, maximize, rounds)?;

                let trained = model.cross_validate()
                    .and_then(|_| model.generate_holdout_pred().map(|_| ()));
                match trained {
                    Ok(()) => {
                        if self.config.verbose {
                            summary::print_folds(
                                model.name(), model.fold_scores(), model.best_rounds(),
                            );
                        }
                        self.layer1.push(model);
                        self.layer1_inputs.push(setting.input);
                    },
                    Err(e @ ScreeningError::Training { .. }) => {
                        warn!(model = %name, error = %e, "left out of the ensemble");
                    },
                    Err(e) => return Err(e),
                }
            }
        }

        if self.layer1.is_empty() {
            return Err(ScreeningError::training(
                ENSEMBLE, "every first-layer model failed to train",
            ));
        }
        Ok(())
    }


    fn train_second_layer(&mut self) -> Result<()> {
        let label_source = self.settings[0].bundle.clone();
        for metric in self.config.layer2_metric_list() {
            for kind in LAYER2_KINDS {
                let name = format!("layer2_{kind}_{metric}");
                let mut model = SecondLayerModel::new(
                    &name, label_source.clone(), &self.layer1, kind, metric,
                )?;
                let (mut params, maximize, rounds) = model.default_params();
                params.seed = self.config.seed;
                model.configure(params, metric, maximize, rounds)?;

                match model.cross_validate() {
                    Ok(_) => {
                        if self.config.verbose {
                            summary::print_folds(
                                model.name(), model.fold_scores(), model.best_rounds(),
                            );
                        }
                        self.layer2.push(model);
                    },
                    Err(e @ ScreeningError::Training { .. }) => {
                        warn!(model = %name, error = %e, "left out of the ensemble");
                    },
                    Err(e) => return Err(e),
                }
            }
        }

        if self.layer2.is_empty() {
            return Err(ScreeningError::training(
                ENSEMBLE, "no second-layer model could be built",
            ));
        }
        Ok(())
    }


    fn score(&self) -> Result<ResultCollector> {
        let eval_metric = self.config.eval_metric;
        let test_labels = self.test_labels();
        let mut result = ResultCollector::new(self.folds.n_folds());

        for model in &self.layer1 {
            let predictions = model.predict_test()?;
            let metric = model.eval_metric();
            let test = test_score(model.name(), metric, test_labels, &predictions);
            let cv = model.cv_score().unwrap_or((f64::NAN, f64::NAN));
            let selectable = model.kind().is_classifier() && metric == eval_metric;
            result.push(model.name(), 1, model.kind(), metric, cv, test, selectable);
        }
        for model in &self.layer2 {
            let predictions = model.predict_test()?;
            let metric = model.eval_metric();
            let test = test_score(model.name(), metric, test_labels, &predictions);
            let cv = model.cv_score().unwrap_or((f64::NAN, f64::NAN));
            let selectable = metric == eval_metric;
            result.push(model.name(), 2, model.kind(), metric, cv, test, selectable);
        }

        let best = result.select(eval_metric)
            .ok_or_else(|| ScreeningError::training(
                ENSEMBLE, format!("no model was scored with {eval_metric}"),
            ))?;
        info!(
            model = %best.name,
            cv = best.cv_mean,
            test = best.test_score,
            weighted = best.weighted_score.unwrap_or(f64::NAN),
            "selected the best model",
        );
        Ok(result)
    }


    fn collector(&self) -> Result<&ResultCollector> {
        self.result.as_ref()
            .ok_or_else(|| ScreeningError::State(
                "`train` must be called before reading the results".into()
            ))
    }


    /// Returns the record of the selected model.
    pub fn training_result(&self) -> Result<&EnsembleRecord> {
        self.collector()?
            .best()
            .ok_or_else(|| ScreeningError::State("no model was selected".into()))
    }


    /// Returns the records of every model.
    pub fn detail_result(&self) -> Result<&[EnsembleRecord]> {
        Ok(self.collector()?.records())
    }


    /// Returns the name of the selected model.
    pub fn best_model_name(&self) -> Result<&str> {
        Ok(&self.training_result()?.name)
    }


    /// Predict with the selected model.
    /// `samples` holds one feature sample per input, in input order.
    pub fn predict(&self, samples: &[Sample]) -> Result<Vec<f64>> {
        let best = self.training_result()?;
        if samples.len() != self.inputs.len() {
            return Err(ScreeningError::DataShape(format!(
                "expected {} feature samples, got {}",
                self.inputs.len(), samples.len(),
            )));
        }

        if best.layer == 1 {
            let (model, &input) = self.layer1.iter()
                .zip(&self.layer1_inputs)
                .find(|(model, _)| model.name() == best.name)
                .ok_or_else(|| missing_model(&best.name))?;
            return model.predict(&samples[input]);
        }

        let model = self.layer2.iter()
            .find(|model| model.name() == best.name)
            .ok_or_else(|| missing_model(&best.name))?;
        let first_layer = self.layer1.iter()
            .zip(&self.layer1_inputs)
            .map(|(model, &input)| model.predict(&samples[input]))
            .collect::<Result<Vec<_>>>()?;
        model.predict(&first_layer)
    }


    /// Test predictions of the selected model.
    pub fn best_test_predictions(&self) -> Result<Vec<f64>> {
        let best = self.training_result()?;
        if best.layer == 1 {
            self.layer1.iter()
                .find(|model| model.name() == best.name)
                .ok_or_else(|| missing_model(&best.name))?
                .predict_test()
        } else {
            self.layer2.iter()
                .find(|model| model.name() == best.name)
                .ok_or_else(|| missing_model(&best.name))?
                .predict_test()
        }
    }


    /// Returns the primary labels of the test split.
    pub fn test_labels(&self) -> &[f64] {
        self.settings[0].bundle.test_labels()
    }


    /// Returns the data bundle of the primary label.
    pub fn primary_bundle(&self) -> &DataBundle {
        &self.settings[0].bundle
    }


    /// Returns the trained first-layer models.
    pub fn layer1_models(&self) -> &[FirstLayerModel] {
        &self.layer1[..]
    }


    /// Returns the trained second-layer models.
    pub fn layer2_models(&self) -> &[SecondLayerModel] {
        &self.layer2[..]
    }


    /// Returns the shared fold assignment.
    pub fn fold_assignment(&self) -> &FoldAssignment {
        &self.folds
    }


    /// Returns the settings.
    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }
}


fn missing_model(name: &str) -> ScreeningError {
    ScreeningError::State(format!("the selected model `{name}` is not trained"))
}


fn test_score(name: &str, metric: EvalMetric, y_true: &[f64], y_score: &[f64]) -> f64 {
    metric.evaluate(y_true, y_score)
        .unwrap_or_else(|e| {
            warn!(model = name, error = %e, "test score set to 0");
            0.0
        })
}
