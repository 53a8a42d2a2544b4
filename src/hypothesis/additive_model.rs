use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::{
    common::{LossFunction, Objective},
    Regressor,
    Sample,
};


/// A struct that the gradient boosting machine returns.
/// The raw score of an example is
/// `base_score + learning_rate * sum(h(x))`,
/// and [`Regressor::predict`] maps it through the objective
/// (a probability for [`Objective::Logistic`]).
/// You can read/write this struct by `Serde` trait.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdditiveModel<H> {
    /// The raw score before the first round.
    pub base_score: f64,
    /// Shrinkage applied to every hypothesis.
    pub learning_rate: f64,
    /// The objective the model was trained for.
    pub objective: Objective,
    /// Hypotheses, one per boosting round.
    pub hypotheses: Vec<H>,
}


impl<H> AdditiveModel<H> {
    /// Construct an empty model.
    #[inline]
    pub fn new(base_score: f64, learning_rate: f64, objective: Objective)
        -> Self
    {
        Self { base_score, learning_rate, objective, hypotheses: Vec::new(), }
    }


    /// Append the hypothesis of the next round.
    #[inline]
    pub fn push(&mut self, hypothesis: H) {
        self.hypotheses.push(hypothesis);
    }


    /// Keep the first `n_rounds` hypotheses only.
    #[inline]
    pub fn truncate(&mut self, n_rounds: usize) {
        self.hypotheses.truncate(n_rounds);
    }


    /// Returns the number of boosting rounds.
    #[inline]
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }


    /// Returns `true` if no round has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }
}


impl<H> AdditiveModel<H>
    where H: Regressor,
{
    /// Returns the raw score of the `row`-th example.
    pub fn raw_score(&self, sample: &Sample, row: usize) -> f64 {
        let sum = self.hypotheses.iter()
            .map(|h| h.predict(sample, row))
            .sum::<f64>();
        self.base_score + self.learning_rate * sum
    }
}


impl<H> AdditiveModel<H>
    where H: Regressor + Sync,
{
    /// Returns the raw scores of every example.
    pub fn raw_scores(&self, sample: &Sample) -> Vec<f64> {
        let n_sample = sample.shape().0;
        (0..n_sample).into_par_iter()
            .map(|row| self.raw_score(sample, row))
            .collect()
    }
}


impl<H> Regressor for AdditiveModel<H>
    where H: Regressor + Sync,
{
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        self.objective.transform(self.raw_score(sample, row))
    }


    fn predict_all(&self, sample: &Sample) -> Vec<f64> {
        self.raw_scores(sample)
            .into_iter()
            .map(|raw| self.objective.transform(raw))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Feature;

    struct Constant(f64);

    impl Regressor for Constant {
        fn predict(&self, _sample: &Sample, _row: usize) -> f64 {
            self.0
        }
    }

    #[test]
    fn shrunk_sum_through_the_link() {
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", vec![0.0, 1.0])], Vec::new(),
        ).unwrap();
        let mut model = AdditiveModel::new(1.0, 0.5, Objective::Regression);
        model.push(Constant(2.0));
        model.push(Constant(4.0));
        assert_eq!(model.predict_all(&sample), vec![4.0, 4.0]);

        model.truncate(1);
        assert_eq!(model.raw_score(&sample, 0), 2.0);

        let mut model = AdditiveModel::<Constant>::new(0.0, 0.1, Objective::Logistic);
        assert!(model.is_empty());
        model.push(Constant(0.0));
        assert_eq!(model.predict(&sample, 1), 0.5);
    }
}
