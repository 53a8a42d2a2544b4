/// This file defines the linear weak learner.
pub mod linear_algorithm;
/// This file defines the linear regressor.
pub mod linear_regressor;


pub use linear_algorithm::LinearLearner;
pub use linear_regressor::LinearRegressor;
