//! Two-layer stacked ensembles.
mod labeled_features;
mod ensemble_config;
mod result_collector;
mod vs_ensemble;

pub use labeled_features::LabeledFeatures;
pub use ensemble_config::{
    EnsembleConfig,
    DEFAULT_HELD_OUT_FOLDS,
    DEFAULT_N_FOLDS,
    DEFAULT_SEED,
};
pub use result_collector::{weighted_score, EnsembleRecord, ResultCollector};
pub use vs_ensemble::VsEnsemble;
