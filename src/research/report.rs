//! CSV reports of a trained ensemble.
use polars::prelude::*;
use tracing::{info, warn};

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::ensemble::{EnsembleRecord, VsEnsemble};
use crate::error::Result;
use crate::metric::{enrichment_curve, Enrichment, DEFAULT_EF_RATIOS};
use super::plot::plot_enrichment;


fn write_frame(path: &Path, mut df: DataFrame) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}


/// The records as a table, one row per model.
pub fn records_frame(records: &[EnsembleRecord]) -> Result<DataFrame> {
    let column = |f: fn(&EnsembleRecord) -> f64| {
        records.iter().map(f).collect::<Vec<_>>()
    };
    let df = DataFrame::new(vec![
        Series::new("model", records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>()),
        Series::new("layer", records.iter().map(|r| r.layer as u32).collect::<Vec<_>>()),
        Series::new("kind", records.iter().map(|r| r.kind.name()).collect::<Vec<_>>()),
        Series::new("metric", records.iter().map(|r| r.metric.name()).collect::<Vec<_>>()),
        Series::new("cv_result", column(|r| r.cv_mean)),
        Series::new("cv_std", column(|r| r.cv_std)),
        Series::new("test_result", column(|r| r.test_score)),
        Series::new(
            "weighted_score",
            records.iter().map(|r| r.weighted_score).collect::<Vec<_>>(),
        ),
        Series::new("selectable", records.iter().map(|r| r.selectable).collect::<Vec<_>>()),
    ])?;
    Ok(df)
}


/// The best validation score and round of every fold of every model.
pub fn cv_folds_frame(ensemble: &VsEnsemble) -> Result<DataFrame> {
    let layer1 = ensemble.layer1_models().iter()
        .map(|m| (m.name(), m.fold_scores(), m.best_rounds()));
    let layer2 = ensemble.layer2_models().iter()
        .map(|m| (m.name(), m.fold_scores(), m.best_rounds()));

    let mut names = Vec::new();
    let mut folds = Vec::new();
    let mut scores = Vec::new();
    let mut rounds = Vec::new();
    for (name, fold_scores, best_rounds) in layer1.chain(layer2) {
        for (fold, (&score, &round)) in fold_scores.iter().zip(best_rounds).enumerate() {
            names.push(name.to_string());
            folds.push(fold as u32);
            scores.push(score);
            rounds.push(round as u32);
        }
    }
    let df = DataFrame::new(vec![
        Series::new("model", names),
        Series::new("fold", folds),
        Series::new("best_score", scores),
        Series::new("best_round", rounds),
    ])?;
    Ok(df)
}


/// An enrichment curve as a table.
pub fn enrichment_frame(curve: &[(f64, Enrichment)]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new("ratio", curve.iter().map(|(r, _)| *r).collect::<Vec<_>>()),
        Series::new(
            "n_actives",
            curve.iter().map(|(_, e)| e.n_actives as u32).collect::<Vec<_>>(),
        ),
        Series::new("EF", curve.iter().map(|(_, e)| e.ef).collect::<Vec<_>>()),
        Series::new("EF_max", curve.iter().map(|(_, e)| e.ef_max).collect::<Vec<_>>()),
    ])?;
    Ok(df)
}


/// Paths of the files written by [`write_reports`].
#[derive(Debug, Clone, Default)]
pub struct ReportPaths {
    /// The best record.
    pub result: PathBuf,
    /// Every record.
    pub all_models: PathBuf,
    /// Per-fold scores.
    pub cv_folds: PathBuf,
    /// Enrichment of the best model on the test split.
    pub enrichment: PathBuf,
    /// The enrichment chart, unless drawing failed.
    pub enrichment_plot: Option<PathBuf>,
    /// The fold assignment.
    pub folds: PathBuf,
}


/// Write the reports of a trained ensemble into `output_dir`,
/// every file prefixed by `target`.
pub fn write_reports<P: AsRef<Path>>(
    ensemble: &VsEnsemble,
    output_dir: P,
    target: &str,
) -> Result<ReportPaths>
{
    let dir = output_dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = |suffix: &str| dir.join(format!("{target}_{suffix}"));

    let best = ensemble.training_result()?;
    let records = ensemble.detail_result()?;

    let paths = ReportPaths {
        result: path("result.csv"),
        all_models: path("result_allModels.csv"),
        cv_folds: path("cv_folds.csv"),
        enrichment: path("enrichment.csv"),
        enrichment_plot: None,
        folds: path("folds.csv"),
    };

    write_frame(&paths.result, records_frame(std::slice::from_ref(best))?)?;
    write_frame(&paths.all_models, records_frame(records)?)?;
    write_frame(&paths.cv_folds, cv_folds_frame(ensemble)?)?;
    ensemble.fold_assignment().write_csv(&paths.folds)?;

    let predictions = ensemble.best_test_predictions()?;
    let curve = enrichment_curve(
        ensemble.test_labels(), &predictions, &DEFAULT_EF_RATIOS,
    );
    write_frame(&paths.enrichment, enrichment_frame(&curve)?)?;

    let svg = path("enrichment.svg");
    let title = format!("{target}: {}", best.name);
    let enrichment_plot = match plot_enrichment(&svg, &title, &curve) {
        Ok(()) => Some(svg),
        Err(e) => {
            warn!(error = %e, "could not draw the enrichment chart");
            None
        },
    };

    info!(dir = %dir.display(), "wrote reports");
    Ok(ReportPaths { enrichment_plot, ..paths })
}


/// Write predictions with a leading row index.
pub fn write_predictions<P: AsRef<Path>>(path: P, predictions: &[f64]) -> Result<()> {
    let index = (0..predictions.len() as u64).collect::<Vec<_>>();
    let df = DataFrame::new(vec![
        Series::new("index", index),
        Series::new("prediction", predictions.to_vec()),
    ])?;
    write_frame(path.as_ref(), df)
}
