//! The files in `weak_learner/` directory defines
//! `WeakLearner` trait and weak learners.

/// Provides WeakLearner trait.
pub mod core;

/// Defines Regression Tree.
pub mod regression_tree;

/// Defines the linear weak learner.
pub mod linear;


pub use self::core::WeakLearner;

pub use self::regression_tree::{
    RegressionTree,
    RegressionTreeBuilder,
    RegressionTreeRegressor,
};

pub use self::linear::{
    LinearLearner,
    LinearRegressor,
};
