//! Provides `WeakLearner` trait.
use crate::{common::GradientHessian, Sample};


/// A trait that defines the behavior of a weak learner
/// in the gradient boosting protocol.
///
/// Given the gradient and the Hessian of the loss at every example,
/// a weak learner returns a hypothesis that approximately minimizes
/// the second-order expansion of the loss.
///
/// # Required Methods
/// - [`WeakLearner::name`]
/// - [`WeakLearner::produce`]
/// - [`WeakLearner::info`] ... optional.
pub trait WeakLearner {
    /// The hypothesis type the weak learner returns.
    type Hypothesis;


    /// Returns the name of the weak learner.
    fn name(&self) -> &str;


    /// Returns the information of the weak learner as `String`.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// Returns a hypothesis fitted to `gh`,
    /// the derivatives of the loss at every example of `sample`.
    fn produce(&self, sample: &Sample, gh: &[GradientHessian])
        -> Self::Hypothesis;
}
