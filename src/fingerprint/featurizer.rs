use fixedbitset::FixedBitSet;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Result, ScreeningError};
use crate::sample::Sample;
use super::{BuiltinToolkit, FingerprintKind, FingerprintToolkit};


/// Turns a column of SMILES strings into fingerprints.
///
/// A molecule that cannot be parsed becomes an all-zero vector
/// and is counted in [`Featurizer::n_failed`].
/// In strict mode, the first such molecule is an error instead.
///
/// # Example
/// ```no_run
/// use vsboosts::prelude::*;
/// let mut featurizer = Featurizer::new(FingerprintKind::morgan());
/// let fps = featurizer.compute(&["CCO", "c1ccccc1"]).unwrap();
/// assert_eq!(fps[0].len(), 1024);
/// ```
pub struct Featurizer<T = BuiltinToolkit> {
    toolkit: T,
    kind: FingerprintKind,
    strict: bool,
    n_failed: usize,
}


impl Featurizer<BuiltinToolkit> {
    /// Construct a featurizer that uses the built-in toolkit.
    pub fn new(kind: FingerprintKind) -> Self {
        Self::with_toolkit(BuiltinToolkit, kind)
    }
}


impl<T> Featurizer<T>
    where T: FingerprintToolkit + Sync,
{
    /// Construct a featurizer with the given toolkit.
    pub fn with_toolkit(toolkit: T, kind: FingerprintKind) -> Self {
        Self { toolkit, kind, strict: false, n_failed: 0, }
    }


    /// If `true`, an unparsable molecule is an error.
    /// Default is `false`.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }


    /// Returns the fingerprint kind.
    pub fn kind(&self) -> FingerprintKind {
        self.kind
    }


    /// Returns the number of molecules that fell back to a zero vector.
    pub fn n_failed(&self) -> usize {
        self.n_failed
    }


    /// Compute the fingerprints of `smiles`.
    pub fn compute<S>(&mut self, smiles: &[S]) -> Result<Vec<FixedBitSet>>
        where S: AsRef<str> + Sync,
    {
        let n_bits = self.kind.n_bits();
        let computed = smiles.par_iter()
            .map(|s| {
                self.toolkit.compute(s.as_ref(), self.kind)
                    .filter(|fp| fp.len() == n_bits)
            })
            .collect::<Vec<_>>();

        let mut failed = 0;
        let mut fingerprints = Vec::with_capacity(computed.len());
        for (index, fp) in computed.into_iter().enumerate() {
            match fp {
                Some(fp) => fingerprints.push(fp),
                None => {
                    let smiles = smiles[index].as_ref().to_string();
                    if self.strict {
                        return Err(ScreeningError::Molecule { index, smiles });
                    }
                    debug!(index, smiles = %smiles, "fingerprint fell back to zeros");
                    failed += 1;
                    fingerprints.push(FixedBitSet::with_capacity(n_bits));
                },
            }
        }

        if failed > 0 {
            warn!(
                kind = %self.kind,
                n_failed = failed,
                n_total = smiles.len(),
                "some molecules could not be parsed",
            );
        }
        self.n_failed += failed;
        Ok(fingerprints)
    }


    /// Compute the fingerprints of `smiles` as an unlabeled [`Sample`].
    pub fn to_sample<S>(&mut self, smiles: &[S]) -> Result<Sample>
        where S: AsRef<str> + Sync,
    {
        let fingerprints = self.compute(smiles)?;
        Sample::from_fingerprints(
            self.kind.prefix(), &fingerprints, self.kind.n_bits(),
        )
    }
}


/// Render a fingerprint as a `0`/`1` string.
pub fn to_bit_string(fp: &FixedBitSet) -> String {
    (0..fp.len())
        .map(|i| if fp[i] { '1' } else { '0' })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_smiles_become_zero_vectors() {
        let mut featurizer = Featurizer::new(FingerprintKind::MaccsKeys);
        let fps = featurizer.compute(&["CCO", "not a molecule", "C1CC"])
            .unwrap();
        assert_eq!(fps.len(), 3);
        assert_eq!(featurizer.n_failed(), 2);
        assert!(fps.iter().all(|fp| fp.len() == 167));
        assert_eq!(fps[1].count_ones(..), 0);
        assert!(fps[0].count_ones(..) > 0);
    }

    #[test]
    fn strict_mode_reports_the_molecule() {
        let mut featurizer = Featurizer::new(FingerprintKind::morgan())
            .strict(true);
        let err = featurizer.compute(&["CCO", "C(("]).unwrap_err();
        match err {
            ScreeningError::Molecule { index, smiles } => {
                assert_eq!(index, 1);
                assert_eq!(smiles, "C((");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bit_string_has_full_width() {
        let mut fp = FixedBitSet::with_capacity(5);
        fp.insert(0);
        fp.insert(3);
        assert_eq!(to_bit_string(&fp), "10010");
    }
}
