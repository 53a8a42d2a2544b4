//! Provides the gradient boosting machine.

mod gbm;


pub use gbm::{GBM, BoostingResult};
