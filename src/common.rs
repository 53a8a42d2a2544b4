//! Defines some common functions used in this library.

/// Defines loss function trait and the training objectives.
pub mod loss_functions;

/// Defines some small numerical helpers.
pub mod utils;


pub use loss_functions::{GradientHessian, LossFunction, Objective};
