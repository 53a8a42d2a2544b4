#![warn(missing_docs)]

//! 
//! A crate for virtual screening with stacked gradient boosting.
//! 
//! Molecules become fixed-width fingerprints.
//! Gradient-boosted first-layer models are trained
//! on stratified cross-validation folds,
//! and their out-of-fold predictions feed second-layer meta models.
//! Every model is scored on a held-out test split,
//! and one model is selected by a blend of its CV and test scores.
//! 
//! The boosting engine follows a repeated game
//! between a [`Booster`] and a [`WeakLearner`]:
//! 
//! - [`GBM`] is a second-order gradient boosting machine
//!     with a logistic or a squared-error [`Objective`].
//! - [`RegressionTree`] grows trees on binned features.
//! - [`LinearLearner`] fits a linear function by coordinate descent.
//! 
//! # Example
//! ```no_run
//! use vsboosts::prelude::*;
//! 
//! let smiles = vec!["CCO", "c1ccccc1", "CC(=O)O", "CCN"];
//! let labels = vec![1.0, 0.0, 1.0, 0.0];
//! 
//! let features = Featurizer::new(FingerprintKind::morgan())
//!     .to_sample(&smiles)
//!     .unwrap();
//! let input = LabeledFeatures::new("morgan", features)
//!     .label("active", labels);
//! 
//! let config = EnsembleConfig::new(EvalMetric::RocAuc).n_folds(4);
//! let mut ensemble = VsEnsemble::new(vec![input], config).unwrap();
//! let result = ensemble.train().unwrap();
//! println!("{:?}", result.best());
//! ```

pub mod error;
pub mod sample;
pub mod fingerprint;
pub mod fold;
pub mod data;
pub mod common;
pub mod hypothesis;
pub mod weak_learner;
pub mod booster;
pub mod metric;
pub mod model;
pub mod ensemble;
pub mod research;
pub mod config;
pub mod pipeline;
pub mod prelude;


pub use error::{Result, ScreeningError};

pub use sample::{Feature, Sample, SampleReader};

pub use common::{GradientHessian, LossFunction, Objective};

pub use hypothesis::{AdditiveModel, Regressor};

pub use weak_learner::{
    WeakLearner,

    RegressionTree,
    RegressionTreeBuilder,
    RegressionTreeRegressor,

    LinearLearner,
    LinearRegressor,
};

pub use booster::{Booster, BoostingResult, EarlyStopping, GBM};

pub use metric::EvalMetric;

pub use model::{FirstLayerModel, ModelKind, SecondLayerModel};

pub use ensemble::{EnsembleConfig, LabeledFeatures, VsEnsemble};
