//! Which base learner and objective a model boosts.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::str::FromStr;

use crate::common::Objective;
use crate::error::{Result, ScreeningError};


/// The weak learner boosted by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseLearner {
    /// Regression trees.
    Tree,
    /// Linear functions.
    Linear,
}


/// A base learner paired with a training objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelKind {
    /// The weak learner.
    pub learner: BaseLearner,
    /// The objective.
    pub objective: Objective,
}


impl ModelKind {
    /// Boosted trees with the logistic objective.
    pub const GBTREE_LOGISTIC: Self = Self::new(BaseLearner::Tree, Objective::Logistic);
    /// Boosted linear functions with the logistic objective.
    pub const GBLINEAR_LOGISTIC: Self = Self::new(BaseLearner::Linear, Objective::Logistic);
    /// Boosted trees with the squared error.
    pub const GBTREE_REGRESSION: Self = Self::new(BaseLearner::Tree, Objective::Regression);
    /// Boosted linear functions with the squared error.
    pub const GBLINEAR_REGRESSION: Self = Self::new(BaseLearner::Linear, Objective::Regression);

    /// The four kinds, in the order models are built.
    pub const ALL: [Self; 4] = [
        Self::GBTREE_LOGISTIC,
        Self::GBLINEAR_LOGISTIC,
        Self::GBTREE_REGRESSION,
        Self::GBLINEAR_REGRESSION,
    ];


    /// Construct a new kind.
    pub const fn new(learner: BaseLearner, objective: Objective) -> Self {
        Self { learner, objective }
    }


    /// Returns the name of `self`, e.g. `GbtreeLogistic`.
    pub fn name(&self) -> &'static str {
        match (self.learner, self.objective) {
            (BaseLearner::Tree, Objective::Logistic) => "GbtreeLogistic",
            (BaseLearner::Linear, Objective::Logistic) => "GblinearLogistic",
            (BaseLearner::Tree, Objective::Regression) => "GbtreeRegression",
            (BaseLearner::Linear, Objective::Regression) => "GblinearRegression",
        }
    }


    /// Returns `true` if the model outputs a probability.
    pub fn is_classifier(&self) -> bool {
        self.objective == Objective::Logistic
    }
}


impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


impl FromStr for ModelKind {
    type Err = ScreeningError;
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScreeningError::Config(format!(
                "unknown model kind `{s}`"
            )))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
        }
        assert!("GbdartLogistic".parse::<ModelKind>().is_err());
    }
}
