//! Enrichment factor of a ranked screening list.
use serde::{Serialize, Deserialize};

use crate::error::{Result, ScreeningError};
use super::ranking::descending_order;


/// Ratios swept by [`enrichment_curve`] in the reports.
pub const DEFAULT_EF_RATIOS: [f64; 8] = [
    0.001, 0.0015, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2,
];

// `ratio * n` is floored after this nudge,
// so that e.g. `0.29 * 100` selects 29 examples.
const FLOOR_TOLERANCE: f64 = 1e-9;


/// The enrichment of the top-ranked fraction of a screening list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Number of actives among the selected examples.
    pub n_actives: usize,
    /// Active rate of the selection over the overall active rate.
    pub ef: f64,
    /// The largest `ef` any ranking can reach for this selection size.
    pub ef_max: f64,
}


/// Number of examples selected by `ratio` out of `n`.
pub(crate) fn n_selected(ratio: f64, n: usize) -> Result<usize> {
    if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
        return Err(ScreeningError::InvalidRatio(format!(
            "the ratio must be in (0, 1], got {ratio}"
        )));
    }
    let n_selected = (ratio * n as f64 + FLOOR_TOLERANCE).floor() as usize;
    if n_selected == 0 {
        return Err(ScreeningError::InvalidRatio(format!(
            "ratio {ratio} selects no example out of {n}"
        )));
    }
    Ok(n_selected.min(n))
}


/// Enrichment factor of the top `ratio` fraction of examples
/// ranked by `y_score` descending.
/// Tied scores are ranked by original index.
///
/// Fails with [`ScreeningError::InvalidRatio`]
/// if `ratio` is outside `(0, 1]` or `floor(ratio * n)` is zero.
///
/// # Example
/// ```
/// use vsboosts::prelude::*;
/// let y_true = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
/// let y_score = [0.9, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
/// let ef = enrichment_factor(&y_true, &y_score, 0.1).unwrap();
/// assert_eq!(ef.n_actives, 1);
/// assert_eq!(ef.ef, 10.0);
/// ```
pub fn enrichment_factor(y_true: &[f64], y_score: &[f64], ratio: f64)
    -> Result<Enrichment>
{
    debug_assert_eq!(y_true.len(), y_score.len());
    let n = y_true.len();
    let n_selected = n_selected(ratio, n)?;

    let total_actives = y_true.iter().filter(|&&y| y > 0.5).count();
    let n_actives = descending_order(y_score).into_iter()
        .take(n_selected)
        .filter(|&i| y_true[i] > 0.5)
        .count();

    if total_actives == 0 {
        return Ok(Enrichment { n_actives, ef: 0.0, ef_max: 0.0 });
    }

    let base_rate = total_actives as f64 / n as f64;
    let ef = (n_actives as f64 / n_selected as f64) / base_rate;
    let ef_max = (total_actives.min(n_selected) as f64 / n_selected as f64)
        / base_rate;

    Ok(Enrichment { n_actives, ef, ef_max })
}


/// Enrichment over a grid of ratios.
/// Ratios that select no example are skipped.
pub fn enrichment_curve(y_true: &[f64], y_score: &[f64], ratios: &[f64])
    -> Vec<(f64, Enrichment)>
{
    ratios.iter()
        .filter_map(|&ratio| {
            enrichment_factor(y_true, y_score, ratio)
                .ok()
                .map(|ef| (ratio, ef))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_everything_gives_one() {
        let y = [1.0, 0.0, 1.0, 0.0, 0.0];
        let s = [0.3, 0.2, 0.9, 0.1, 0.5];
        let ef = enrichment_factor(&y, &s, 1.0).unwrap();
        assert_eq!(ef.n_actives, 2);
        assert!((ef.ef - 1.0).abs() < 1e-12);
        assert!((ef.ef_max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ties_are_broken_by_index() {
        let y = [0.0, 1.0, 0.0, 0.0];
        let s = [0.5, 0.5, 0.1, 0.1];
        let ef = enrichment_factor(&y, &s, 0.25).unwrap();
        assert_eq!(ef.n_actives, 0);
        assert_eq!(ef.ef, 0.0);
        assert!((ef.ef_max - 4.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_ratios() {
        let y = [1.0, 0.0, 0.0];
        let s = [0.1, 0.2, 0.3];
        for ratio in [0.0, -0.1, 1.5, f64::NAN, 0.1] {
            let err = enrichment_factor(&y, &s, ratio).unwrap_err();
            assert!(matches!(err, ScreeningError::InvalidRatio(_)));
        }
    }

    #[test]
    fn floor_is_robust_to_rounding() {
        assert_eq!(n_selected(0.29, 100).unwrap(), 29);
        assert_eq!(n_selected(0.01, 1000).unwrap(), 10);
    }

    #[test]
    fn no_actives_give_zero() {
        let ef = enrichment_factor(&[0.0, 0.0], &[0.1, 0.2], 0.5).unwrap();
        assert_eq!((ef.n_actives, ef.ef, ef.ef_max), (0, 0.0, 0.0));
    }

    #[test]
    fn curve_skips_tiny_ratios() {
        let y = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let s = [0.9, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
        let curve = enrichment_curve(&y, &s, &DEFAULT_EF_RATIOS);
        let ratios = curve.iter().map(|(r, _)| *r).collect::<Vec<_>>();
        assert_eq!(ratios, vec![0.1, 0.2]);
        assert_eq!(curve[0].1.ef, 10.0);
        assert_eq!(curve[1].1.ef, 5.0);
    }
}
