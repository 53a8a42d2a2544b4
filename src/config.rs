//! JSON configuration of the screening pipeline.
use serde::{Serialize, Deserialize};
use serde_json::Value;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ensemble::{DEFAULT_HELD_OUT_FOLDS, DEFAULT_N_FOLDS, DEFAULT_SEED};
use crate::error::{Result, ScreeningError};
use crate::fingerprint::{FingerprintKind, DEFAULT_MORGAN_BITS, DEFAULT_MORGAN_RADIUS};
use crate::metric::EvalMetric;


const REQUIRED_KEYS: [&str; 5] = [
    "target_name",
    "training_data_path",
    "label_columns",
    "evaluation_metric",
    "output_dir",
];


/// Where the fingerprints of one input come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintSource {
    /// Computed from the SMILES column.
    Smiles(FingerprintKind),
    /// Precomputed in a table column.
    Column {
        /// The fingerprint kind.
        kind: FingerprintKind,
        /// The column holding the fingerprints.
        column: String,
    },
}


impl FingerprintSource {
    /// Returns the fingerprint kind.
    pub fn kind(&self) -> FingerprintKind {
        match self {
            Self::Smiles(kind) | Self::Column { kind, .. } => *kind,
        }
    }
}


/// Settings of one screening run.
///
/// # Example
/// ```
/// use vsboosts::config::PipelineConfig;
/// let config = PipelineConfig::from_json_str(r#"{
///     "target_name": "MUV-466",
///     "training_data_path": "muv466.csv.zip",
///     "label_columns": ["MUV-466"],
///     "evaluation_metric": "ROCAUC",
///     "output_dir": "out",
///     "smiles_column": "smiles"
/// }"#).unwrap();
/// assert_eq!(config.n_folds, 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Prefix of every output file.
    pub target_name: String,
    /// CSV (or zipped CSV) with the training molecules.
    pub training_data_path: PathBuf,
    /// Label columns; the first one is the binary primary label.
    pub label_columns: Vec<String>,
    /// Name of the selection metric, e.g. `ROCAUC`.
    pub evaluation_metric: String,
    /// Directory of the reports.
    pub output_dir: PathBuf,
    /// Column with SMILES strings.
    #[serde(default)]
    pub smiles_column: Option<String>,
    /// Precomputed fingerprint columns, keyed by kind (`morgan`, `maccs`).
    #[serde(default)]
    pub fingerprint_columns: Option<BTreeMap<String, String>>,
    /// Molecules to predict with the selected model.
    #[serde(default)]
    pub prediction_data_path: Option<PathBuf>,
    /// Number of folds.
    #[serde(default = "default_n_folds")]
    pub n_folds: usize,
    /// Number of folds held out as the test split.
    #[serde(default = "default_held_out_folds")]
    pub held_out_folds: usize,
    /// Seed of the folds and the boosters.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Fail on unparsable SMILES instead of using zero vectors.
    #[serde(default)]
    pub strict_fingerprints: bool,
    /// Radius of computed Morgan fingerprints.
    #[serde(default = "default_morgan_radius")]
    pub morgan_radius: usize,
    /// Width of computed Morgan fingerprints.
    #[serde(default = "default_morgan_bits")]
    pub morgan_bits: usize,
    /// Metrics of the second-layer models.
    #[serde(default)]
    pub layer2_metrics: Vec<String>,
    /// Print progress tables.
    #[serde(default)]
    pub verbose: bool,
    /// Fold assignment file, read if it exists and written otherwise.
    #[serde(default)]
    pub fold_file: Option<PathBuf>,
}


fn default_n_folds() -> usize { DEFAULT_N_FOLDS }
fn default_held_out_folds() -> usize { DEFAULT_HELD_OUT_FOLDS }
fn default_seed() -> u64 { DEFAULT_SEED }
fn default_morgan_radius() -> usize { DEFAULT_MORGAN_RADIUS }
fn default_morgan_bits() -> usize { DEFAULT_MORGAN_BITS }


impl PipelineConfig {
    /// Read and validate the configuration file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ScreeningError::Config(format!(
                "cannot read {}: {e}", path.display(),
            )))?;
        Self::from_json_str(&text)
    }


    /// Parse and validate a configuration.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ScreeningError::Config(format!("malformed JSON: {e}")))?;
        let Some(object) = value.as_object() else {
            return Err(ScreeningError::Config(
                "the configuration must be a JSON object".into()
            ));
        };
        let missing = REQUIRED_KEYS.iter()
            .filter(|key| object.get(**key).map_or(true, Value::is_null))
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ScreeningError::Config(format!(
                "missing required key(s): {}", missing.join(", "),
            )));
        }

        let config: Self = serde_json::from_value(value)
            .map_err(|e| ScreeningError::Config(format!("invalid value: {e}")))?;
        config.validate()?;
        Ok(config)
    }


    /// Check the values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.target_name.trim().is_empty() {
            return Err(ScreeningError::Config("`target_name` is empty".into()));
        }
        if self.label_columns.is_empty() {
            return Err(ScreeningError::Config("`label_columns` is empty".into()));
        }
        self.eval_metric()?;
        self.layer2_metric_list()?;
        self.fingerprint_sources()?;
        if self.n_folds < self.held_out_folds + 2 || self.held_out_folds == 0 {
            return Err(ScreeningError::Config(format!(
                "`n_folds` = {} and `held_out_folds` = {} leave fewer than 2 \
                 cross-validation folds",
                self.n_folds, self.held_out_folds,
            )));
        }
        if self.morgan_bits == 0 {
            return Err(ScreeningError::Config("`morgan_bits` must be positive".into()));
        }
        Ok(())
    }


    /// Returns the selection metric.
    pub fn eval_metric(&self) -> Result<EvalMetric> {
        EvalMetric::from_name(&self.evaluation_metric)
            .map_err(|_| unknown_metric("evaluation_metric", &self.evaluation_metric))
    }


    /// Returns the metrics of the second-layer models.
    pub fn layer2_metric_list(&self) -> Result<Vec<EvalMetric>> {
        self.layer2_metrics.iter()
            .map(|name| {
                EvalMetric::from_name(name)
                    .map_err(|_| unknown_metric("layer2_metrics", name))
            })
            .collect()
    }


    /// One source per input, in input order.
    /// Precomputed columns win over the SMILES column.
    pub fn fingerprint_sources(&self) -> Result<Vec<FingerprintSource>> {
        let morgan = FingerprintKind::Morgan {
            radius: self.morgan_radius,
            n_bits: self.morgan_bits,
        };
        match (&self.fingerprint_columns, &self.smiles_column) {
            (Some(columns), _) if !columns.is_empty() => {
                columns.iter()
                    .map(|(kind, column)| {
                        let kind = match kind.to_ascii_lowercase().as_str() {
                            "morgan" | "ecfp" => morgan,
                            "maccs" => FingerprintKind::MaccsKeys,
                            _ => return Err(ScreeningError::Config(format!(
                                "unknown fingerprint kind `{kind}` in \
                                 `fingerprint_columns`"
                            ))),
                        };
                        Ok(FingerprintSource::Column { kind, column: column.clone() })
                    })
                    .collect()
            },
            (_, Some(_)) => Ok(vec![
                FingerprintSource::Smiles(morgan),
                FingerprintSource::Smiles(FingerprintKind::MaccsKeys),
            ]),
            _ => Err(ScreeningError::Config(
                "missing required key: `smiles_column` or `fingerprint_columns`".into()
            )),
        }
    }
}


fn unknown_metric(key: &str, name: &str) -> ScreeningError {
    let known = EvalMetric::ALL.iter()
        .map(|m| m.name())
        .collect::<Vec<_>>()
        .join(", ");
    ScreeningError::Config(format!(
        "`{key}`: unknown metric `{name}`, expected one of {known}"
    ))
}


#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "target_name": "t",
        "training_data_path": "train.csv",
        "label_columns": ["active"],
        "evaluation_metric": "rocauc",
        "output_dir": "out",
        "fingerprint_columns": {"maccs": "fp_maccs", "morgan": "fp_morgan"}
    }"#;

    #[test]
    fn defaults_are_filled() {
        let config = PipelineConfig::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.n_folds, DEFAULT_N_FOLDS);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.eval_metric().unwrap(), EvalMetric::RocAuc);
        let sources = config.fingerprint_sources().unwrap();
        assert_eq!(sources[0].kind(), FingerprintKind::MaccsKeys);
        assert_eq!(sources[1].kind(), FingerprintKind::morgan());
    }

    #[test]
    fn missing_keys_are_listed() {
        let err = PipelineConfig::from_json_str(r#"{"target_name": "t"}"#)
            .unwrap_err();
        let ScreeningError::Config(message) = err else { panic!("{err:?}") };
        assert!(message.contains("training_data_path"));
        assert!(message.contains("output_dir"));
        assert!(!message.contains("target_name"));
    }

    #[test]
    fn needs_a_fingerprint_source() {
        let text = MINIMAL.replace(
            r#""fingerprint_columns": {"maccs": "fp_maccs", "morgan": "fp_morgan"}"#,
            r#""verbose": true"#,
        );
        let err = PipelineConfig::from_json_str(&text).unwrap_err();
        assert!(matches!(err, ScreeningError::Config(m) if m.contains("smiles_column")));
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let text = MINIMAL.replace("rocauc", "F1");
        assert!(matches!(
            PipelineConfig::from_json_str(&text),
            Err(ScreeningError::Config(_)),
        ));
    }
}
