//! Provides the boosting framework and the gradient boosting machine.

mod core;
mod early_stopping;
mod gradient_boost;


/// Booster trait
pub use self::core::Booster;

pub use self::early_stopping::EarlyStopping;

pub use self::gradient_boost::{
    GBM,
    BoostingResult,
};
