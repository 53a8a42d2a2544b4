//! Error type shared by every stage of the pipeline.
use thiserror::Error;


/// Errors raised while loading data, training models, or evaluating them.
#[derive(Debug, Error)]
pub enum ScreeningError {
    /// A required configuration key is missing or has an invalid value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Labels are not numeric, a column is absent,
    /// or the row counts of the inputs disagree.
    #[error("data shape error: {0}")]
    DataShape(String),

    /// The labels cannot be stratified into the requested folds.
    #[error("invalid label: {0}")]
    InvalidLabel(String),

    /// The enrichment ratio selects no example.
    #[error("invalid ratio: {0}")]
    InvalidRatio(String),

    /// A model failed to train (non-finite loss or metric).
    #[error("training error in `{model}`: {reason}")]
    Training {
        /// Name of the model that failed.
        model: String,
        /// What went wrong.
        reason: String,
    },

    /// An operation was called in the wrong lifecycle state.
    #[error("state error: {0}")]
    State(String),

    /// A SMILES string could not be parsed in strict mode.
    #[error("failed to parse molecule #{index}: `{smiles}`")]
    Molecule {
        /// Row index of the molecule.
        index: usize,
        /// The offending SMILES string.
        smiles: String,
    },

    /// Failed to draw a chart.
    #[error("plot error: {0}")]
    Plot(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error from polars while reading or writing a table.
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    /// Error while decoding the configuration file.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error while opening a zip-compressed input.
    #[error(transparent)]
    Zip(#[from] ::zip::result::ZipError),
}


impl ScreeningError {
    pub(crate) fn training<S, R>(model: S, reason: R) -> Self
        where S: ToString,
              R: ToString,
    {
        Self::Training {
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }
}


/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ScreeningError>;
