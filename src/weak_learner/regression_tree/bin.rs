use std::fmt;
use std::ops::{Add, Sub};

use crate::{common::GradientHessian, Feature};


/// Gradient/Hessian sums of the examples falling into one bin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct BinStat {
    pub(crate) grad: f64,
    pub(crate) hess: f64,
    pub(crate) count: usize,
}


impl Add for BinStat {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            grad: self.grad + rhs.grad,
            hess: self.hess + rhs.hess,
            count: self.count + rhs.count,
        }
    }
}


impl Sub for BinStat {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            grad: self.grad - rhs.grad,
            hess: self.hess - rhs.hess,
            count: self.count - rhs.count,
        }
    }
}


/// Binning: A feature processing.
///
/// `edges` splits the real line into `edges.len() + 1` bins.
/// The `b`-th bin is `[edges[b-1], edges[b])`,
/// with the outermost bins open towards infinity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bins {
    edges: Vec<f64>,
}


impl Bins {
    /// Cut the given `Feature` into (at most) `n_bins` bins.
    /// This method naively cut the range of the feature with same width.
    /// A constant feature has a single bin.
    pub(crate) fn cut(feature: &Feature, n_bins: usize) -> Self {
        let (min, max) = feature.min_max();
        if n_bins < 2 || !(min < max) {
            return Self { edges: Vec::new() };
        }

        let width = (max - min) / n_bins as f64;
        let mut edges = (1..n_bins)
            .map(|k| min + width * k as f64)
            .filter(|e| e.is_finite())
            .collect::<Vec<_>>();
        edges.dedup();

        Self { edges }
    }


    /// Returns the number of bins.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.edges.len() + 1
    }


    /// Returns `true` if the feature can be split at all.
    #[inline]
    pub(crate) fn is_splittable(&self) -> bool {
        !self.edges.is_empty()
    }


    /// Returns the bin that contains `x`.
    /// Agrees with [`Splitter::split`](super::split_rule::Splitter::split):
    /// `x` is in a bin left of `edges[b]` iff `x < edges[b]`.
    #[inline]
    pub(crate) fn index_of(&self, x: f64) -> usize {
        self.edges.partition_point(|&e| !(x < e))
    }


    /// The threshold that separates bins `..=b` from bins `b+1..`.
    #[inline]
    pub(crate) fn threshold(&self, b: usize) -> f64 {
        self.edges[b]
    }


    /// Sum up the derivatives of the examples `indices` per bin.
    pub(crate) fn pack(
        &self,
        indices: &[usize],
        feature: &Feature,
        gh: &[GradientHessian],
    ) -> Vec<BinStat>
    {
        let mut packed = vec![BinStat::default(); self.len()];
        for &i in indices {
            let stat = &mut packed[self.index_of(feature[i])];
            stat.grad += gh[i].grad;
            stat.hess += gh[i].hess;
            stat.count += 1;
        }
        packed
    }
}


const PRINT_BIN_SIZE: usize = 3;


fn signed(value: f64) -> String {
    let sgn = if value > 0.0 {
        '+'
    } else if value < 0.0 {
        '-'
    } else {
        ' '
    };
    format!("{sgn}{:.2}", value.abs())
}


impl fmt::Display for Bins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bounds = std::iter::once("-Inf".to_string())
            .chain(self.edges.iter().map(|&e| signed(e)))
            .chain(std::iter::once("+Inf".to_string()))
            .collect::<Vec<_>>();
        let bins = bounds.windows(2)
            .map(|w| format!("[{}, {})", w[0], w[1]))
            .collect::<Vec<_>>();

        if bins.len() > PRINT_BIN_SIZE {
            let head = bins[..2].join(", ");
            let tail = &bins[bins.len() - 1];
            write!(f, "{head},      ...     , {tail}")
        } else {
            write!(f, "{}", bins.join(", "))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_column_has_one_edge() {
        let feature = Feature::from_values("b", vec![0.0, 1.0, 1.0, 0.0]);
        let bins = Bins::cut(&feature, feature.distinct_value_count());
        assert_eq!(bins.len(), 2);
        assert_eq!(bins.threshold(0), 0.5);
        assert_eq!(bins.index_of(0.0), 0);
        assert_eq!(bins.index_of(1.0), 1);
        assert_eq!(format!("{bins}"), "[-Inf, +0.50), [+0.50, +Inf)");
    }

    #[test]
    fn constant_column_cannot_split() {
        let feature = Feature::from_values("c", vec![3.0, 3.0]);
        assert!(!Bins::cut(&feature, 255).is_splittable());
    }

    #[test]
    fn pack_sums_per_bin() {
        let feature = Feature::from_values("x", vec![0.0, 1.0, 2.0, 3.0]);
        let bins = Bins::cut(&feature, 2);
        let gh = vec![GradientHessian::new(1.0, 1.0); 4];
        let packed = bins.pack(&[0, 1, 2, 3], &feature, &gh);
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[0].count, 2);
        assert_eq!(packed[1].grad, 2.0);
    }
}
