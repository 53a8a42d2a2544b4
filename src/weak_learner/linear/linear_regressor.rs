use serde::{Serialize, Deserialize};

use crate::{Regressor, Sample};


/// An affine function `bias + sum(w_j * x_j)`
/// with the nonzero weights stored sparsely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    /// The intercept.
    pub bias: f64,
    /// Pairs of `(feature index, weight)`.
    pub weights: Vec<(usize, f64)>,
}


impl Regressor for LinearRegressor {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        self.weights.iter()
            .map(|&(j, w)| w * sample.value(row, j))
            .sum::<f64>()
            + self.bias
    }
}
