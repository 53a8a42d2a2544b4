//! Provides Gradient Boosting Machine ([`GBM`]) by Friedman, 2001,
//! with the second-order (Newton) steps of XGBoost.
use rayon::prelude::*;
use tracing::trace;

use crate::{
    common::{LossFunction, Objective},
    error::{Result, ScreeningError},
    metric::EvalMetric,
    AdditiveModel,
    Booster,
    EarlyStopping,
    Regressor,
    Sample,
    WeakLearner,
};

use std::mem;
use std::ops::ControlFlow;


/// Default shrinkage.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
/// Default number of boosting rounds.
pub const DEFAULT_MAX_ITER: usize = 100;


/// The Gradient Boosting Machine proposed in the following paper:
///
/// [Jerome H. Friedman, 2001 - Greedy Function Approximation: A Gradient Boosting Machine](https://projecteuclid.org/journals/annals-of-statistics/volume-29/issue-5/Greedy-function-approximation-A-gradient-boostingmachine/10.1214/aos/1013203451.full)
///
/// In each round, `GBM` computes the gradient and the Hessian
/// of the objective at the current raw predictions,
/// asks the weak learner for a hypothesis fitted to them,
/// and adds the hypothesis scaled by the learning rate.
///
/// If a validation sample is set,
/// every round is scored with an [`EvalMetric`]
/// and boosting stops after `early_stopping_rounds` rounds
/// without strict improvement.
/// The returned model is truncated to the best round.
///
/// # Example
/// ```no_run
/// use vsboosts::prelude::*;
///
/// # let train = Sample::from_columns(vec![], vec![]).unwrap();
/// # let valid = train.clone();
/// let weak_learner = RegressionTreeBuilder::new(&train)
///     .max_depth(3)
///     .build();
///
/// let mut booster = GBM::init_with_loss(&train, Objective::Logistic)
///     .learning_rate(0.1)
///     .max_iter(300)
///     .validation(&valid, EvalMetric::RocAuc, true, 30);
///
/// let result = booster.run(&weak_learner).unwrap();
/// let probabilities = result.model.predict_all(&valid);
/// ```
pub struct GBM<'a, H> {
    // Training data
    sample: &'a Sample,

    objective: Objective,
    learning_rate: f64,

    // Max iteration until GBM stops.
    max_iter: usize,

    monitor: Option<Monitor<'a>>,

    // Raw predictions on the training examples.
    predictions: Vec<f64>,

    model: AdditiveModel<H>,

    // Validation score of every round.
    history: Vec<f64>,

    // Set when a round produces a non-finite value.
    failure: Option<String>,

    // Terminated iteration.
    terminated: usize,
}


struct Monitor<'a> {
    sample: &'a Sample,
    metric: EvalMetric,
    maximize: bool,
    early_stopping: EarlyStopping,
    predictions: Vec<f64>,
}


/// What [`GBM`] returns.
#[derive(Debug, Clone)]
pub struct BoostingResult<H> {
    /// The model, truncated to the best round if a validation set was used.
    pub model: AdditiveModel<H>,
    /// The number of rounds in `model`.
    pub best_iteration: usize,
    /// The validation score of the best round.
    pub best_score: Option<f64>,
    /// The validation score of every round run.
    pub history: Vec<f64>,
    /// The round at which boosting stopped.
    pub terminated: usize,
}


impl<'a, H> GBM<'a, H> {
    /// Initialize the `GBM` for the given objective.
    pub fn init_with_loss(sample: &'a Sample, objective: Objective) -> Self {
        let n_sample = sample.shape().0;
        let base_score = objective.base_score(sample.target());

        Self {
            sample,
            objective,
            learning_rate: DEFAULT_LEARNING_RATE,
            max_iter: DEFAULT_MAX_ITER,
            monitor: None,
            predictions: vec![base_score; n_sample],
            model: AdditiveModel::new(base_score, DEFAULT_LEARNING_RATE, objective),
            history: Vec::new(),
            failure: None,
            terminated: usize::MAX,
        }
    }


    /// Set the learning rate (shrinkage).
    /// Default value is `0.1`.
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }


    /// Set the maximal number of boosting rounds.
    /// Default value is `100`.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }


    /// Score every round on `sample` with `metric`
    /// and stop after `early_stopping_rounds` rounds without improvement.
    pub fn validation(
        mut self,
        sample: &'a Sample,
        metric: EvalMetric,
        maximize: bool,
        early_stopping_rounds: usize,
    ) -> Self
    {
        self.monitor = Some(Monitor {
            sample,
            metric,
            maximize,
            early_stopping: EarlyStopping::new(early_stopping_rounds, maximize),
            predictions: Vec::new(),
        });
        self
    }


    /// Returns the objective.
    pub fn objective(&self) -> Objective {
        self.objective
    }
}


impl<H> Booster<H> for GBM<'_, H>
    where H: Regressor,
{
    type Output = Result<BoostingResult<H>>;


    fn name(&self) -> &str {
        "Gradient Boosting Machine"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let (n_sample, n_feature) = self.sample.shape();
        let metric = self.monitor.as_ref()
            .map(|m| m.metric.name().to_string())
            .unwrap_or_else(|| "-".to_string());
        let info = Vec::from([
            ("# of examples", format!("{n_sample}")),
            ("# of features", format!("{n_feature}")),
            ("Objective", self.objective.name().to_string()),
            ("Learning rate", format!("{}", self.learning_rate)),
            ("Max iteration", format!("{}", self.max_iter)),
            ("Eval metric", metric),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) {
        let n_sample = self.sample.shape().0;
        let base_score = self.objective.base_score(self.sample.target());

        self.predictions = vec![base_score; n_sample];
        self.model = AdditiveModel::new(
            base_score, self.learning_rate, self.objective,
        );
        self.history = Vec::with_capacity(self.max_iter);
        self.terminated = self.max_iter;
        self.failure = None;

        if !self.sample.has_target() {
            self.failure = Some("the training sample has no target".into());
        }

        if let Some(monitor) = self.monitor.as_mut() {
            let n_valid = monitor.sample.shape().0;
            monitor.predictions = vec![base_score; n_valid];
            monitor.early_stopping = EarlyStopping::new(
                monitor.early_stopping.patience(),
                monitor.maximize,
            );
            if !monitor.sample.has_target() {
                self.failure = Some("the validation sample has no target".into());
            }
        }
    }


    fn boost<W>(
        &mut self,
        weak_learner: &W,
        iteration: usize,
    ) -> ControlFlow<usize>
        where W: WeakLearner<Hypothesis = H>,
    {
        if self.failure.is_some() {
            self.terminated = iteration - 1;
            return ControlFlow::Break(self.terminated);
        }
        if self.max_iter < iteration {
            return ControlFlow::Break(self.max_iter);
        }

        let target = self.sample.target();
        let gh = self.objective.gradient_hessian(&self.predictions[..], target);

        // Get a new hypothesis
        let h = weak_learner.produce(self.sample, &gh[..]);

        let eta = self.learning_rate;
        let delta = h.predict_all(self.sample);
        self.predictions.par_iter_mut()
            .zip(delta)
            .for_each(|(p, d)| { *p += eta * d; });

        let loss = self.objective.eval(&self.predictions[..], target);
        if !loss.is_finite() {
            self.failure = Some(format!("training loss is {loss} at round {iteration}"));
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        }

        let objective = self.objective;
        let mut stop = false;
        if let Some(monitor) = self.monitor.as_mut() {
            let delta = h.predict_all(monitor.sample);
            monitor.predictions.par_iter_mut()
                .zip(delta)
                .for_each(|(p, d)| { *p += eta * d; });

            let output = monitor.predictions.iter()
                .map(|&raw| objective.transform(raw))
                .collect::<Vec<_>>();
            let score = monitor.metric.monitor(monitor.sample.target(), &output);
            trace!(iteration, loss, score, "boosting round");

            if !score.is_finite() {
                self.failure = Some(format!(
                    "{} is {score} at round {iteration}", monitor.metric,
                ));
                self.terminated = iteration;
                return ControlFlow::Break(iteration);
            }
            self.history.push(score);
            stop = monitor.early_stopping.should_stop(score);
        } else {
            trace!(iteration, loss, "boosting round");
        }

        self.model.push(h);

        if stop {
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        }
        ControlFlow::Continue(())
    }


    fn postprocess(&mut self) -> Self::Output {
        if let Some(reason) = self.failure.take() {
            return Err(ScreeningError::training(self.name(), reason));
        }

        let mut model = mem::replace(
            &mut self.model,
            AdditiveModel::new(0.0, self.learning_rate, self.objective),
        );
        let history = mem::take(&mut self.history);

        let (best_iteration, best_score) = match self.monitor.as_ref() {
            Some(monitor) if !history.is_empty() => {
                let best_round = monitor.early_stopping.best_round();
                (best_round + 1, monitor.early_stopping.best_value())
            },
            _ => (model.len(), None),
        };
        model.truncate(best_iteration);

        Ok(BoostingResult {
            model,
            best_iteration,
            best_score,
            history,
            terminated: self.terminated,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::GradientHessian;
    use crate::sample::Feature;

    // Fits a single Newton step shared by every example.
    struct ConstantLearner;

    #[derive(Debug, Clone)]
    struct Constant(f64);

    impl Regressor for Constant {
        fn predict(&self, _sample: &Sample, _row: usize) -> f64 {
            self.0
        }
    }

    impl WeakLearner for ConstantLearner {
        type Hypothesis = Constant;
        fn name(&self) -> &str { "Constant" }
        fn produce(&self, _sample: &Sample, gh: &[GradientHessian]) -> Constant {
            let g = gh.iter().map(|x| x.grad).sum::<f64>();
            let h = gh.iter().map(|x| x.hess).sum::<f64>();
            Constant(-g / h)
        }
    }

    struct NanLearner;

    impl WeakLearner for NanLearner {
        type Hypothesis = Constant;
        fn name(&self) -> &str { "NaN" }
        fn produce(&self, _sample: &Sample, _gh: &[GradientHessian]) -> Constant {
            Constant(f64::NAN)
        }
    }

    fn sample(target: Vec<f64>) -> Sample {
        let x = (0..target.len()).map(|i| i as f64).collect();
        Sample::from_columns(vec![Feature::from_values("x", x)], target).unwrap()
    }

    #[test]
    fn logistic_converges_to_the_base_rate() {
        let train = sample(vec![1.0, 1.0, 1.0, 0.0]);
        let mut gbm = GBM::init_with_loss(&train, Objective::Logistic)
            .learning_rate(0.5)
            .max_iter(50);
        let result = gbm.run(&ConstantLearner).unwrap();
        assert_eq!(result.best_iteration, 50);
        assert!(result.best_score.is_none());
        let p = result.model.predict(&train, 0);
        assert!((p - 0.75).abs() < 1e-3, "got {p}");
    }

    #[test]
    fn flat_validation_keeps_the_first_round() {
        let train = sample(vec![1.0, 0.0, 1.0, 0.0]);
        let valid = sample(vec![0.0, 1.0]);
        let mut gbm = GBM::init_with_loss(&train, Objective::Logistic)
            .max_iter(100)
            .validation(&valid, EvalMetric::RocAuc, true, 5);
        let result = gbm.run(&ConstantLearner).unwrap();

        // A constant score always has ROC-AUC 0.5.
        assert_eq!(result.history, vec![0.5; 6]);
        assert_eq!(result.best_iteration, 1);
        assert_eq!(result.model.len(), 1);
        assert_eq!(result.best_score, Some(0.5));
        assert_eq!(result.terminated, 6);
    }

    #[test]
    fn non_finite_loss_is_a_training_error() {
        let train = sample(vec![1.0, 0.0]);
        let mut gbm = GBM::init_with_loss(&train, Objective::Regression);
        let err = gbm.run(&NanLearner).unwrap_err();
        assert!(matches!(err, ScreeningError::Training { .. }));
    }
}
