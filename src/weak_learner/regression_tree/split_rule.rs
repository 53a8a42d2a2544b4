//! This file defines split rules for regression tree.
use serde::{Serialize, Deserialize};

use crate::Sample;


/// The output of the function `split` of `Splitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LeftRight {
    Left,
    Right,
}


/// Sends an example left if its `feature`-th value is below `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Splitter {
    pub(crate) feature: usize,
    pub(crate) threshold: f64,
}


impl Splitter {
    #[inline]
    pub(crate) fn new(feature: usize, threshold: f64) -> Self {
        Self { feature, threshold }
    }


    /// Defines the splitting.
    #[inline]
    pub(crate) fn split(&self, sample: &Sample, row: usize) -> LeftRight {
        let value = sample.value(row, self.feature);

        if value < self.threshold { LeftRight::Left } else { LeftRight::Right }
    }
}
