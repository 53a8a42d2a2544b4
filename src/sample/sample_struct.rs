use std::collections::{HashMap, HashSet};
use std::ops::Index;

use fixedbitset::FixedBitSet;
use rayon::prelude::*;

use crate::error::{Result, ScreeningError};
use super::feature::*;


/// Struct `Sample` holds a batch sample in a column-major format.
/// Each column is a [`Feature`]; the target values are kept apart.
#[derive(Debug, Clone)]
pub struct Sample {
    pub(super) name_to_index: HashMap<String, usize>,
    pub(super) features: Vec<Feature>,
    pub(super) target: Vec<f64>,
    pub(super) n_sample: usize,
    pub(super) n_feature: usize,
}


impl Sample {
    /// Construct a `Sample` from columns and a target vector.
    /// Pass an empty `target` for unlabeled data.
    pub fn from_columns(features: Vec<Feature>, target: Vec<f64>)
        -> Result<Self>
    {
        let n_sample = features.first()
            .map(|feat| feat.len())
            .unwrap_or(target.len());

        if let Some(feat) = features.iter().find(|f| f.len() != n_sample) {
            return Err(ScreeningError::DataShape(format!(
                "feature `{}` has {} rows, expected {n_sample}",
                feat.name(), feat.len(),
            )));
        }
        if !target.is_empty() && target.len() != n_sample {
            return Err(ScreeningError::DataShape(format!(
                "target has {} rows, features have {n_sample}",
                target.len(),
            )));
        }

        let n_feature = features.len();
        let name_to_index = index_names(&features);
        Ok(Self { name_to_index, features, target, n_sample, n_feature, })
    }


    /// Construct an unlabeled `Sample` from fingerprints.
    /// The `j`-th column is named `{prefix}_{j}`.
    /// Every fingerprint must have `width` bits.
    pub fn from_fingerprints<S>(
        prefix: S,
        fingerprints: &[FixedBitSet],
        width: usize,
    ) -> Result<Self>
        where S: AsRef<str>
    {
        let prefix = prefix.as_ref();
        if let Some((i, fp)) = fingerprints.iter()
            .enumerate()
            .find(|(_, fp)| fp.len() != width)
        {
            return Err(ScreeningError::DataShape(format!(
                "fingerprint #{i} has {} bits, expected {width}",
                fp.len(),
            )));
        }

        let features = (0..width).into_par_iter()
            .map(|j| {
                let vals = fingerprints.iter()
                    .map(|fp| if fp[j] { 1f64 } else { 0f64 })
                    .collect::<Vec<_>>();
                Feature::from_values(format!("{prefix}_{j}"), vals)
            })
            .collect::<Vec<_>>();

        let mut sample = Self::from_columns(features, Vec::new())?;
        sample.n_sample = fingerprints.len();
        Ok(sample)
    }


    /// Replace the target values of `self`.
    pub fn with_target(mut self, target: Vec<f64>) -> Result<Self> {
        if target.len() != self.n_sample {
            return Err(ScreeningError::DataShape(format!(
                "target has {} rows, sample has {}",
                target.len(), self.n_sample,
            )));
        }
        self.target = target;
        Ok(self)
    }


    /// Returns the slice of target values.
    pub fn target(&self) -> &[f64] {
        &self.target[..]
    }


    /// Returns `true` if the target values are set.
    pub fn has_target(&self) -> bool {
        self.n_sample > 0 && self.target.len() == self.n_sample
    }


    /// Returns the unique target values in ascending order.
    pub fn unique_target(&self) -> Vec<f64> {
        let mut target = self.target.clone();
        target.sort_by(|a, b| a.total_cmp(b));
        target.dedup();
        target
    }


    /// Returns a slice of the features.
    pub fn features(&self) -> &[Feature] {
        &self.features[..]
    }


    /// Returns the feature names in column order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter()
            .map(|feat| feat.name())
            .collect()
    }


    /// Returns the pair of the number of examples and
    /// the number of features
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sample, self.n_feature)
    }


    /// Returns the value at `(row, col)`.
    #[inline(always)]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.features[col][row]
    }


    /// Set the feature (column) names.
    /// Returns the old names.
    pub fn replace_names<S, T>(&mut self, names: T) -> Result<Vec<String>>
        where S: ToString,
              T: AsRef<[S]>,
    {
        let names = names.as_ref();
        if names.len() != self.n_feature {
            return Err(ScreeningError::DataShape(format!(
                "got {} names for {} features",
                names.len(), self.n_feature,
            )));
        }

        let old_names = names.iter()
            .zip(&mut self.features[..])
            .map(|(name, feature)| feature.replace_name(name.to_string()))
            .collect();

        self.name_to_index = index_names(&self.features);
        Ok(old_names)
    }


    /// Returns the `idx`-th instance `(x, y)`.
    /// `y` is `NaN` for unlabeled samples.
    pub fn at(&self, idx: usize) -> (Vec<f64>, f64) {
        let x = self.features.iter()
            .map(|feat| feat[idx])
            .collect::<Vec<f64>>();
        let y = self.target.get(idx).copied().unwrap_or(f64::NAN);

        (x, y)
    }


    /// Returns a new sample that consists of the rows `ix` in that order.
    pub fn subset<T>(&self, ix: T) -> Self
        where T: AsRef<[usize]>
    {
        let ix = ix.as_ref();
        let features = self.features.par_iter()
            .map(|feat| feat.gather(ix))
            .collect::<Vec<_>>();
        let target = if self.has_target() {
            ix.iter().map(|&i| self.target[i]).collect()
        } else {
            Vec::new()
        };

        Self {
            name_to_index: self.name_to_index.clone(),
            features,
            target,
            n_sample: ix.len(),
            n_feature: self.n_feature,
        }
    }
}


/// Check that `target` holds exactly the two classes `0` and `1`.
pub(crate) fn check_binary(target: &[f64]) -> Result<()> {
    let set = target.iter()
        .map(|y| y.to_bits())
        .collect::<HashSet<_>>();

    let is_01 = set.iter()
        .all(|&b| b == 0f64.to_bits() || b == 1f64.to_bits());
    if set.len() != 2 || !is_01 {
        let mut line = set.into_iter()
            .map(f64::from_bits)
            .collect::<Vec<_>>();
        line.sort_by(|a, b| a.total_cmp(b));
        let line = line.iter()
            .take(5)
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ScreeningError::InvalidLabel(format!(
            "expected binary labels in {{0, 1}}, got [{line}]"
        )));
    }
    Ok(())
}


fn index_names(features: &[Feature]) -> HashMap<String, usize> {
    features.iter()
        .enumerate()
        .map(|(i, f)| (f.name().to_string(), i))
        .collect()
}


impl<S> Index<S> for Sample
    where S: AsRef<str>
{
    type Output = Feature;

    fn index(&self, name: S) -> &Self::Output {
        let name: &str = name.as_ref();
        let k = *self.name_to_index.get(name)
            .unwrap_or_else(|| panic!("The feature `{name}` does not exist"));
        &self.features[k]
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Sample {
        let features = vec![
            Feature::from_values("a", vec![0.0, 1.0, 2.0, 3.0]),
            Feature::from_values("b", vec![1.0, 1.0, 0.0, 0.0]),
        ];
        Sample::from_columns(features, vec![0.0, 1.0, 0.0, 1.0]).unwrap()
    }

    #[test]
    fn subset_preserves_order_and_target() {
        let sample = toy();
        let sub = sample.subset([3, 1]);
        assert_eq!(sub.shape(), (2, 2));
        assert_eq!(sub["a"].values(), &[3.0, 1.0]);
        assert_eq!(sub.target(), &[1.0, 1.0]);
    }

    #[test]
    fn mismatched_target_is_rejected() {
        let features = vec![Feature::from_values("a", vec![0.0, 1.0])];
        let err = Sample::from_columns(features, vec![1.0]).unwrap_err();
        assert!(matches!(err, ScreeningError::DataShape(_)));
    }

    #[test]
    fn fingerprints_become_bit_columns() {
        let mut fp = FixedBitSet::with_capacity(3);
        fp.insert(1);
        let empty = FixedBitSet::with_capacity(3);
        let sample = Sample::from_fingerprints("ecfp", &[fp, empty], 3)
            .unwrap();
        assert_eq!(sample.shape(), (2, 3));
        assert_eq!(sample["ecfp_1"].values(), &[1.0, 0.0]);
        assert!(!sample.has_target());
    }

    #[test]
    fn binary_check_rejects_continuous_labels() {
        assert!(check_binary(&[0.0, 1.0, 1.0]).is_ok());
        assert!(check_binary(&[0.0, 0.5, 1.0]).is_err());
        assert!(check_binary(&[1.0, 1.0]).is_err());
    }
}
