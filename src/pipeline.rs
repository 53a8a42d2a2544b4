//! End-to-end screening run: read, featurize, train, report.
use tracing::info;

use std::path::PathBuf;

use crate::Sample;
use crate::config::{FingerprintSource, PipelineConfig};
use crate::ensemble::{EnsembleConfig, LabeledFeatures, ResultCollector, VsEnsemble};
use crate::error::{Result, ScreeningError};
use crate::fingerprint::{Featurizer, FingerprintKind};
use crate::fold::FoldAssignment;
use crate::research::{write_predictions, write_reports, ReportPaths};
use crate::sample::Table;


/// What a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The scores of every model.
    pub result: ResultCollector,
    /// The report files.
    pub reports: ReportPaths,
    /// The prediction file, if prediction data was configured.
    pub prediction: Option<PathBuf>,
}


/// A screening run described by a [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}


impl Pipeline {
    /// Construct a run from a validated configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }


    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }


    /// Read the training table into one labeled input per fingerprint source.
    /// Rows without a primary label are dropped.
    pub fn load_inputs(&self) -> Result<Vec<LabeledFeatures>> {
        let primary = &self.config.label_columns[0];
        let table = Table::read(&self.config.training_data_path)?
            .drop_missing(primary)?;

        let labels = self.config.label_columns.iter()
            .map(|name| Ok((name.clone(), table.label_column(name)?)))
            .collect::<Result<Vec<_>>>()?;

        self.featurize(&table)?
            .into_iter()
            .map(|(name, features)| {
                let input = labels.iter()
                    .fold(LabeledFeatures::new(name, features), |input, (label, values)| {
                        input.label(label, values.clone())
                    });
                Ok(input)
            })
            .collect()
    }


    /// One feature sample per fingerprint source.
    fn featurize(&self, table: &Table) -> Result<Vec<(String, Sample)>> {
        self.config.fingerprint_sources()?
            .into_iter()
            .map(|source| {
                let kind = source.kind();
                let sample = match &source {
                    FingerprintSource::Column { column, .. } => {
                        table.fingerprint_column(column, kind.prefix())?
                    },
                    FingerprintSource::Smiles(kind) => self.from_smiles(table, *kind)?,
                };
                Ok((kind.prefix().to_string(), sample))
            })
            .collect()
    }


    /// Like [`Pipeline::featurize`], but a fingerprint column
    /// missing from `table` is computed from the SMILES column instead.
    /// Every sample must be as wide as its training input.
    fn featurize_prediction(&self, table: &Table, widths: &[usize])
        -> Result<Vec<Sample>>
    {
        self.config.fingerprint_sources()?
            .into_iter()
            .zip(widths)
            .map(|(source, &width)| {
                let kind = source.kind();
                let sample = match &source {
                    FingerprintSource::Column { column, .. }
                        if table.has_column(column)
                        || self.config.smiles_column.is_none() =>
                    {
                        table.fingerprint_column(column, kind.prefix())?
                    },
                    _ => {
                        info!(
                            kind = %kind,
                            "computing prediction fingerprints from SMILES",
                        );
                        self.from_smiles(table, kind)?
                    },
                };
                let n_feature = sample.shape().1;
                if n_feature != width {
                    return Err(ScreeningError::DataShape(format!(
                        "the {} prediction fingerprints have {n_feature} bits, \
                         the training ones have {width}",
                        kind.prefix(),
                    )));
                }
                Ok(sample)
            })
            .collect()
    }


    fn from_smiles(&self, table: &Table, kind: FingerprintKind) -> Result<Sample> {
        let column = self.config.smiles_column.as_deref()
            .unwrap_or("smiles");
        let smiles = table.text_column(column)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect::<Vec<_>>();
        Featurizer::new(kind)
            .strict(self.config.strict_fingerprints)
            .to_sample(&smiles)
    }


    fn ensemble_config(&self) -> Result<EnsembleConfig> {
        let mut config = EnsembleConfig::new(self.config.eval_metric()?)
            .n_folds(self.config.n_folds)
            .held_out_folds(self.config.held_out_folds)
            .seed(self.config.seed)
            .layer2_metrics(self.config.layer2_metric_list()?)
            .verbose(self.config.verbose);
        if let Some(path) = self.config.fold_file.as_ref().filter(|p| p.is_file()) {
            info!(path = %path.display(), "reading fold assignment");
            config = config.fold_assignment(
                FoldAssignment::read_csv(path, self.config.seed)?
            );
        }
        Ok(config)
    }


    /// Run the whole pipeline.
    pub fn run(&self) -> Result<PipelineOutput> {
        let inputs = self.load_inputs()?;
        let widths = inputs.iter()
            .map(|input| input.features.shape().1)
            .collect::<Vec<_>>();
        let mut ensemble = VsEnsemble::new(inputs, self.ensemble_config()?)?;

        // Prediction inputs are checked before any model is trained.
        let prediction_samples = match &self.config.prediction_data_path {
            Some(path) => Some(self.featurize_prediction(&Table::read(path)?, &widths)?),
            None => None,
        };

        if let Some(path) = self.config.fold_file.as_ref().filter(|p| !p.is_file()) {
            ensemble.fold_assignment().write_csv(path)?;
        }

        let result = ensemble.train()?;
        let target = &self.config.target_name;
        let reports = write_reports(&ensemble, &self.config.output_dir, target)?;

        let prediction = match prediction_samples {
            Some(samples) => {
                let predictions = ensemble.predict(&samples)?;
                let out = self.config.output_dir.join(format!("{target}_prediction.csv"));
                write_predictions(&out, &predictions)?;
                Some(out)
            },
            None => None,
        };

        if let Ok(best) = ensemble.training_result() {
            info!(
                target = %target,
                model = %best.name,
                test = best.test_score,
                "screening run finished",
            );
        }
        Ok(PipelineOutput { result, reports, prediction })
    }
}
