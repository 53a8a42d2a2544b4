//! Pointwise losses used to monitor training.


const PROBABILITY_CLIP: f64 = 1e-15;


/// Root mean squared error.
/// Returns `0` for empty inputs.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let mse = y_true.iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}


/// Mean negative log-likelihood of probabilities `y_prob`
/// for labels in `{0, 1}`.
/// Probabilities are clipped to `[1e-15, 1 - 1e-15]`.
/// Returns `0` for empty inputs.
pub fn logloss(y_true: &[f64], y_prob: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_prob.len());
    if y_true.is_empty() {
        return 0.0;
    }
    y_true.iter()
        .zip(y_prob)
        .map(|(&y, &p)| {
            let p = p.clamp(PROBABILITY_CLIP, 1.0 - PROBABILITY_CLIP);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum::<f64>()
        / y_true.len() as f64
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmse_of_constant_error() {
        assert!((rmse(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn logloss_of_a_coin() {
        let loss = logloss(&[1.0, 0.0], &[0.5, 0.5]);
        assert!((loss - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn logloss_is_finite_at_the_boundary() {
        assert!(logloss(&[1.0], &[0.0]).is_finite());
    }
}
