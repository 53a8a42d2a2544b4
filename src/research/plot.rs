//! Enrichment chart.
use plotters::prelude::*;

use std::path::Path;

use crate::error::{Result, ScreeningError};
use crate::metric::Enrichment;


fn plot_error<E: std::fmt::Display>(e: E) -> ScreeningError {
    ScreeningError::Plot(e.to_string())
}


/// Draw EF and EF max against the selection ratio as an SVG file.
pub fn plot_enrichment<P: AsRef<Path>>(
    path: P,
    title: &str,
    curve: &[(f64, Enrichment)],
) -> Result<()>
{
    let root = SVGBackend::new(path.as_ref(), (800, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let x_max = curve.iter().map(|(r, _)| *r).fold(0.0, f64::max).max(1e-3);
    let y_max = curve.iter()
        .map(|(_, e)| e.ef.max(e.ef_max))
        .fold(1.0, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(plot_error)?;

    chart.configure_mesh()
        .x_desc("Ratio")
        .y_desc("Enrichment factor")
        .draw()
        .map_err(plot_error)?;

    chart.draw_series(LineSeries::new(
        curve.iter().map(|(r, e)| (*r, e.ef)),
        &BLUE,
    ))
    .map_err(plot_error)?
    .label("EF")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart.draw_series(LineSeries::new(
        curve.iter().map(|(r, e)| (*r, e.ef_max)),
        &RED,
    ))
    .map_err(plot_error)?
    .label("EF max")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}
