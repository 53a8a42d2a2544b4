//! Scores of every model of an ensemble and the selected one.
use serde::Serialize;

use crate::metric::EvalMetric;
use crate::model::ModelKind;


/// Blend a cross-validation score and a test score.
/// The test split counts as one fold among `n_folds`.
///
/// # Example
/// ```
/// use vsboosts::ensemble::weighted_score;
/// let w = weighted_score(0.80, 0.70, 5);
/// assert!((w - 0.78).abs() < 1e-12);
/// ```
pub fn weighted_score(cv_score: f64, test_score: f64, n_folds: usize) -> f64 {
    let k = n_folds as f64;
    cv_score * (k - 1.0) / k + test_score / k
}


/// The scores of one trained model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleRecord {
    /// Unique model name.
    pub name: String,
    /// `1` or `2`.
    pub layer: u8,
    /// Base learner and objective.
    pub kind: ModelKind,
    /// Metric of `cv_mean` and `test_score`.
    pub metric: EvalMetric,
    /// Mean of the best validation scores.
    pub cv_mean: f64,
    /// Population standard deviation of the best validation scores.
    pub cv_std: f64,
    /// Score on the test split with the primary label.
    pub test_score: f64,
    /// Blend of `cv_mean` and `test_score`, for selectable models.
    pub weighted_score: Option<f64>,
    /// Whether the model competes in the selection.
    pub selectable: bool,
}


/// Ordered records of every trained model
/// and the index of the selected one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultCollector {
    records: Vec<EnsembleRecord>,
    best: Option<usize>,
    n_folds: usize,
}


impl ResultCollector {
    /// Construct an empty collector
    /// for a fold assignment of `n_folds` folds.
    pub fn new(n_folds: usize) -> Self {
        Self { records: Vec::new(), best: None, n_folds }
    }


    /// Append the scores of a model.
    #[allow(clippy::too_many_arguments)]
    pub fn push<S: ToString>(
        &mut self,
        name: S,
        layer: u8,
        kind: ModelKind,
        metric: EvalMetric,
        cv_score: (f64, f64),
        test_score: f64,
        selectable: bool,
    )
    {
        let weighted_score = selectable.then(|| {
            weighted_score(cv_score.0, test_score, self.n_folds)
        });
        self.records.push(EnsembleRecord {
            name: name.to_string(),
            layer,
            kind,
            metric,
            cv_mean: cv_score.0,
            cv_std: cv_score.1,
            test_score,
            weighted_score,
            selectable,
        });
    }


    /// Select the best selectable record under `metric`.
    /// Ties go to the record pushed first.
    pub fn select(&mut self, metric: EvalMetric) -> Option<&EnsembleRecord> {
        let mut best: Option<(usize, f64)> = None;
        for (i, record) in self.records.iter().enumerate() {
            let Some(score) = record.weighted_score else { continue; };
            if !record.selectable || record.metric != metric || !score.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, incumbent)| metric.is_better(score, incumbent)) {
                best = Some((i, score));
            }
        }
        self.best = best.map(|(i, _)| i);
        self.best()
    }


    /// Returns every record in construction order.
    pub fn records(&self) -> &[EnsembleRecord] {
        &self.records[..]
    }


    /// Returns the selected record.
    pub fn best(&self) -> Option<&EnsembleRecord> {
        self.best.map(|i| &self.records[i])
    }


    /// Returns the number of folds used for blending.
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }


    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }


    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn collector(scores: &[(f64, f64, bool)], metric: EvalMetric) -> ResultCollector {
        let mut collector = ResultCollector::new(5);
        for (i, &(cv, test, selectable)) in scores.iter().enumerate() {
            collector.push(
                format!("m{i}"), 1, ModelKind::GBTREE_LOGISTIC, metric,
                (cv, 0.0), test, selectable,
            );
        }
        collector
    }

    #[test]
    fn selects_the_largest_weighted_score() {
        let mut c = collector(
            &[(0.80, 0.70, true), (0.70, 0.99, true), (0.99, 0.99, false)],
            EvalMetric::RocAuc,
        );
        let best = c.select(EvalMetric::RocAuc).unwrap();
        assert_eq!(best.name, "m0");
        assert!((best.weighted_score.unwrap() - 0.78).abs() < 1e-12);
        assert!(c.records()[2].weighted_score.is_none());
    }

    #[test]
    fn ties_go_to_the_first_record() {
        let mut c = collector(
            &[(0.5, 0.5, true), (0.5, 0.5, true)],
            EvalMetric::RocAuc,
        );
        assert_eq!(c.select(EvalMetric::RocAuc).unwrap().name, "m0");
    }

    #[test]
    fn minimized_metrics_select_the_smallest() {
        let mut c = collector(
            &[(0.3, 0.3, true), (0.1, 0.2, true)],
            EvalMetric::Rmse,
        );
        assert_eq!(c.select(EvalMetric::Rmse).unwrap().name, "m1");
    }

    #[test]
    fn nothing_selectable() {
        let mut c = collector(&[(0.9, 0.9, false)], EvalMetric::RocAuc);
        assert!(c.select(EvalMetric::RocAuc).is_none());
        assert!(c.best().is_none());
    }
}
