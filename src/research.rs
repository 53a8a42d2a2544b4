//! Reports of a trained ensemble.
pub mod summary;
pub mod report;
pub mod plot;

pub use report::{write_predictions, write_reports, ReportPaths};
pub use plot::plot_enrichment;
