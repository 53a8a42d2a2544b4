//! The table of evaluation metrics a model can be selected by.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScreeningError};
use super::enrichment::enrichment_factor;
use super::ranking::{bedroc, pr_auc, roc_auc, DEFAULT_BEDROC_ALPHA};
use super::regression::{logloss, rmse};


/// An evaluation metric, looked up by its fixed name.
///
/// | Name      | Metric                          | Direction |
/// |-----------|---------------------------------|-----------|
/// | `ROCAUC`  | ROC-AUC                         | maximize  |
/// | `PRAUC`   | PR-AUC                          | maximize  |
/// | `EFR1`    | Enrichment factor at 1%         | maximize  |
/// | `EFR015`  | Enrichment factor at 0.15%      | maximize  |
/// | `BEDROC`  | BEDROC with `alpha = 20`        | maximize  |
/// | `RMSE`    | Root mean squared error         | minimize  |
/// | `LOGLOSS` | Negative log-likelihood         | minimize  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalMetric {
    /// Area under the ROC curve.
    #[serde(rename = "ROCAUC")]
    RocAuc,
    /// Area under the precision-recall curve.
    #[serde(rename = "PRAUC")]
    PrAuc,
    /// Enrichment factor of the top 1%.
    #[serde(rename = "EFR1")]
    Efr1,
    /// Enrichment factor of the top 0.15%.
    #[serde(rename = "EFR015")]
    Efr015,
    /// BEDROC with `alpha = 20`.
    #[serde(rename = "BEDROC")]
    Bedroc,
    /// Root mean squared error.
    #[serde(rename = "RMSE")]
    Rmse,
    /// Negative log-likelihood of probabilities.
    #[serde(rename = "LOGLOSS")]
    LogLoss,
}


impl EvalMetric {
    /// Every metric, in table order.
    pub const ALL: [Self; 7] = [
        Self::RocAuc,
        Self::PrAuc,
        Self::Efr1,
        Self::Efr015,
        Self::Bedroc,
        Self::Rmse,
        Self::LogLoss,
    ];


    /// Returns the fixed name of `self`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RocAuc => "ROCAUC",
            Self::PrAuc => "PRAUC",
            Self::Efr1 => "EFR1",
            Self::Efr015 => "EFR015",
            Self::Bedroc => "BEDROC",
            Self::Rmse => "RMSE",
            Self::LogLoss => "LOGLOSS",
        }
    }


    /// Look up a metric by its name (case-insensitive).
    pub fn from_name<S: AsRef<str>>(name: S) -> Result<Self> {
        let name = name.as_ref().trim();
        Self::ALL.into_iter()
            .find(|metric| metric.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                let known = Self::ALL.map(|m| m.name()).join(", ");
                ScreeningError::Config(format!(
                    "unknown evaluation metric `{name}` (expected one of {known})"
                ))
            })
    }


    /// Returns `true` if a larger value is better.
    pub fn is_maximize(&self) -> bool {
        !matches!(self, Self::Rmse | Self::LogLoss)
    }


    /// Returns the selection ratio of the enrichment metrics.
    pub fn enrichment_ratio(&self) -> Option<f64> {
        match self {
            Self::Efr1 => Some(0.01),
            Self::Efr015 => Some(0.0015),
            _ => None,
        }
    }


    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    pub fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        if self.is_maximize() {
            candidate > incumbent
        } else {
            candidate < incumbent
        }
    }


    /// Evaluate `y_score` against `y_true`.
    ///
    /// Fails with [`ScreeningError::InvalidRatio`]
    /// if an enrichment metric selects no example.
    pub fn evaluate(&self, y_true: &[f64], y_score: &[f64]) -> Result<f64> {
        let value = match self {
            Self::RocAuc => roc_auc(y_true, y_score),
            Self::PrAuc => pr_auc(y_true, y_score),
            Self::Efr1 | Self::Efr015 => {
                let ratio = self.enrichment_ratio().unwrap_or(1.0);
                enrichment_factor(y_true, y_score, ratio)?.ef
            },
            Self::Bedroc => bedroc(y_true, y_score, DEFAULT_BEDROC_ALPHA),
            Self::Rmse => rmse(y_true, y_score),
            Self::LogLoss => logloss(y_true, y_score),
        };
        Ok(value)
    }


    /// Evaluate `y_score` while monitoring a boosting round.
    /// An enrichment ratio too small for the set scores `0`.
    pub fn monitor(&self, y_true: &[f64], y_score: &[f64]) -> f64 {
        match self.evaluate(y_true, y_score) {
            Ok(value) => value,
            Err(_) => 0.0,
        }
    }
}


impl fmt::Display for EvalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


impl FromStr for EvalMetric {
    type Err = ScreeningError;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for metric in EvalMetric::ALL {
            assert_eq!(EvalMetric::from_name(metric.name()).unwrap(), metric);
        }
        assert_eq!("rocauc".parse::<EvalMetric>().unwrap(), EvalMetric::RocAuc);
    }

    #[test]
    fn unknown_name_is_a_config_error() {
        let err = EvalMetric::from_name("F1").unwrap_err();
        assert!(matches!(err, ScreeningError::Config(_)));
    }

    #[test]
    fn directions() {
        assert!(EvalMetric::Efr1.is_maximize());
        assert!(!EvalMetric::Rmse.is_maximize());
        assert!(EvalMetric::Rmse.is_better(0.1, 0.2));
        assert!(EvalMetric::RocAuc.is_better(0.9, 0.8));
    }

    #[test]
    fn tiny_enrichment_ratio_scores_zero_while_monitoring() {
        let y = [1.0, 0.0, 0.0];
        let s = [0.9, 0.2, 0.1];
        assert!(EvalMetric::Efr1.evaluate(&y, &s).is_err());
        assert_eq!(EvalMetric::Efr1.monitor(&y, &s), 0.0);
    }
}
