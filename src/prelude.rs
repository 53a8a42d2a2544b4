//! Exports the standard types and traits.
//! 
pub use crate::error::{Result, ScreeningError};


pub use crate::sample::{
    Feature,
    Sample,
    SampleReader,
};


pub use crate::fingerprint::{
    Featurizer,
    FingerprintKind,
    FingerprintToolkit,
    to_bit_string,
};


pub use crate::fold::{FoldAssignment, FoldGenerator};


pub use crate::data::{DataBundle, LabelKind, OuterSplit};


pub use crate::common::{GradientHessian, LossFunction, Objective};


pub use crate::booster::{
    // Booster trait
    Booster,

    // Gradient boosting ------------------------
    GBM,
    BoostingResult,
    EarlyStopping,
};


pub use crate::weak_learner::{
    // Weak Learner trait
    WeakLearner,

    // Regression tree
    RegressionTree,
    RegressionTreeBuilder,
    RegressionTreeRegressor,

    // Linear function
    LinearLearner,
    LinearRegressor,
};


pub use crate::hypothesis::{AdditiveModel, Regressor};


pub use crate::metric::{
    roc_auc,
    pr_auc,
    bedroc,
    enrichment_factor,
    enrichment_curve,
    Enrichment,
    EvalMetric,
};


pub use crate::model::{
    BaseLearner,
    BoosterParams,
    FirstLayerModel,
    ModelKind,
    ModelState,
    SecondLayerModel,
};


pub use crate::ensemble::{
    EnsembleConfig,
    EnsembleRecord,
    LabeledFeatures,
    ResultCollector,
    VsEnsemble,
};
