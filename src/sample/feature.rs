use serde::{Serialize, Deserialize};

use std::ops::Index;
use std::slice::Iter;

const BUF_SIZE: usize = 256;


/// A named column of the feature matrix.
/// Fingerprint bits are stored as `0.0` / `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    name: String,
    vals: Vec<f64>,
}


impl Feature {
    /// Construct an empty feature with `name`.
    pub fn new<T: ToString>(name: T) -> Self {
        Self {
            name: name.to_string(),
            vals: Vec::with_capacity(BUF_SIZE),
        }
    }


    /// Construct a feature from its values.
    pub fn from_values<T: ToString>(name: T, vals: Vec<f64>) -> Self {
        Self { name: name.to_string(), vals, }
    }


    /// Get the feature name.
    pub fn name(&self) -> &str {
        &self.name
    }


    pub(super) fn replace_name<S>(&mut self, name: S) -> String
        where S: ToString,
    {
        std::mem::replace(&mut self.name, name.to_string())
    }


    /// Append a value to the end of this feature.
    pub fn append(&mut self, x: f64) {
        self.vals.push(x);
    }


    /// Returns the values of this feature.
    pub fn values(&self) -> &[f64] {
        &self.vals[..]
    }


    /// Consumes `self` and returns the values.
    pub fn into_values(self) -> Vec<f64> {
        self.vals
    }


    /// Returns an iterator over feature values.
    pub fn iter(&self) -> Iter<'_, f64> {
        self.vals.iter()
    }


    /// Returns the number of items in this feature.
    pub fn len(&self) -> usize {
        self.vals.len()
    }


    /// Returns `true` if the feature holds no value.
    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }


    /// Returns the pair `(min, max)` of this feature.
    /// An empty feature returns `(0.0, 0.0)`.
    pub fn min_max(&self) -> (f64, f64) {
        if self.vals.is_empty() { return (0.0, 0.0); }
        self.vals.iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &x| (lo.min(x), hi.max(x)))
    }


    /// Returns the number of distinct values.
    pub fn distinct_value_count(&self) -> usize {
        let mut vals = self.vals.clone();
        vals.sort_by(|a, b| a.total_cmp(b));
        vals.dedup();
        vals.len()
    }


    /// Returns a new feature that consists of the rows `ix`.
    pub(crate) fn gather(&self, ix: &[usize]) -> Self {
        let vals = ix.iter()
            .map(|&i| self.vals[i])
            .collect();
        Self { name: self.name.clone(), vals, }
    }
}


impl Index<usize> for Feature {
    type Output = f64;
    fn index(&self, row: usize) -> &Self::Output {
        &self.vals[row]
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_values_of_a_bit_column() {
        let feat = Feature::from_values("bit_0", vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(feat.distinct_value_count(), 2);
        assert_eq!(feat.min_max(), (0.0, 1.0));
    }

    #[test]
    fn gather_keeps_the_name() {
        let feat = Feature::from_values("x", vec![3.0, 4.0, 5.0]);
        let sub = feat.gather(&[2, 0]);
        assert_eq!(sub.name(), "x");
        assert_eq!(sub.values(), &[5.0, 3.0]);
    }
}
