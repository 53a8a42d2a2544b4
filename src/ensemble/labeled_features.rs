//! One feature set with the labels trained on it.
use crate::Sample;
use crate::error::{Result, ScreeningError};


/// A feature set and one or more named label columns.
///
/// The first label of the first input is the primary label:
/// it must be binary, and it drives fold generation,
/// second-layer training, and test scoring.
#[derive(Debug, Clone)]
pub struct LabeledFeatures {
    /// Name of the feature set, e.g. the fingerprint kind.
    pub name: String,
    /// The features, without target.
    pub features: Sample,
    /// `(label name, values)` pairs, one value per row of `features`.
    pub labels: Vec<(String, Vec<f64>)>,
}


impl LabeledFeatures {
    /// Construct a feature set without labels.
    pub fn new<S: ToString>(name: S, features: Sample) -> Self {
        Self { name: name.to_string(), features, labels: Vec::new() }
    }


    /// Add a label column.
    pub fn label<S: ToString>(mut self, name: S, values: Vec<f64>) -> Self {
        self.labels.push((name.to_string(), values));
        self
    }


    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.features.shape().0
    }


    /// Check that there is at least one label
    /// and every label has one finite value per row.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(ScreeningError::DataShape(format!(
                "feature set `{}` has no label column", self.name,
            )));
        }
        let n_rows = self.n_rows();
        for (label, values) in &self.labels {
            if values.len() != n_rows {
                return Err(ScreeningError::DataShape(format!(
                    "label `{label}` of `{}` has {} rows, the features have {n_rows}",
                    self.name, values.len(),
                )));
            }
            if let Some(p) = values.iter().position(|y| !y.is_finite()) {
                return Err(ScreeningError::DataShape(format!(
                    "label `{label}` of `{}` is not numeric at row {p}",
                    self.name,
                )));
            }
        }
        Ok(())
    }
}
