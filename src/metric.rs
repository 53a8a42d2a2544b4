//! Evaluation metrics for ranked screening lists.
//!
//! Every function here is pure.
//! `y_true` holds labels in `{0, 1}` (anything above `0.5` counts as active)
//! and `y_score` holds the model scores, larger meaning more likely active.

pub mod ranking;
pub mod enrichment;
pub mod regression;
pub mod eval_metric;


pub use ranking::{roc_auc, pr_auc, bedroc, DEFAULT_BEDROC_ALPHA};
pub use enrichment::{
    enrichment_factor,
    enrichment_curve,
    Enrichment,
    DEFAULT_EF_RATIOS,
};
pub use regression::{rmse, logloss};
pub use eval_metric::EvalMetric;
