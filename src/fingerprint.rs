//! Molecular fingerprints.
//!
//! The pipeline only needs `smiles -> fixed-width bit vector`.
//! That conversion lives behind [`FingerprintToolkit`],
//! so a full cheminformatics backend can be plugged in.
//! [`BuiltinToolkit`] is a small pure-Rust implementation
//! that is good enough to run the pipeline end to end.

mod smiles;
mod morgan;
mod maccs;
mod featurizer;


use fixedbitset::FixedBitSet;
use serde::{Serialize, Deserialize};

use std::fmt;

pub use maccs::MACCS_BITS;
pub use featurizer::{Featurizer, to_bit_string};


/// Default radius of the Morgan fingerprint.
pub const DEFAULT_MORGAN_RADIUS: usize = 2;
/// Default width of the Morgan fingerprint.
pub const DEFAULT_MORGAN_BITS: usize = 1024;


/// The kind of fingerprint to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FingerprintKind {
    /// Circular fingerprint hashed into `n_bits` bits.
    Morgan {
        /// Number of bond hops around each atom.
        radius: usize,
        /// Width of the folded bit vector.
        n_bits: usize,
    },
    /// 167-bit structural keys.
    MaccsKeys,
}


impl FingerprintKind {
    /// Morgan fingerprint with radius 2 and 1024 bits.
    pub fn morgan() -> Self {
        Self::Morgan {
            radius: DEFAULT_MORGAN_RADIUS,
            n_bits: DEFAULT_MORGAN_BITS,
        }
    }


    /// Returns the width of the bit vector.
    pub fn n_bits(&self) -> usize {
        match self {
            Self::Morgan { n_bits, .. } => *n_bits,
            Self::MaccsKeys => MACCS_BITS,
        }
    }


    /// Short name used as a column prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Morgan { .. } => "morgan",
            Self::MaccsKeys => "maccs",
        }
    }
}


impl fmt::Display for FingerprintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morgan { radius, n_bits } => {
                write!(f, "Morgan (radius {radius}, {n_bits} bits)")
            },
            Self::MaccsKeys => write!(f, "MACCS keys ({MACCS_BITS} bits)"),
        }
    }
}


/// Converts a SMILES string into a fingerprint.
pub trait FingerprintToolkit {
    /// Returns the fingerprint of `smiles`,
    /// or `None` if the molecule cannot be parsed.
    /// A returned vector always has `kind.n_bits()` bits.
    fn compute(&self, smiles: &str, kind: FingerprintKind)
        -> Option<FixedBitSet>;
}


/// The built-in fingerprint toolkit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinToolkit;


impl FingerprintToolkit for BuiltinToolkit {
    fn compute(&self, smiles: &str, kind: FingerprintKind)
        -> Option<FixedBitSet>
    {
        let mol = smiles::Molecule::parse(smiles)?;
        let bits = match kind {
            FingerprintKind::Morgan { radius, n_bits } => {
                morgan::morgan(&mol, radius, n_bits)
            },
            FingerprintKind::MaccsKeys => maccs::maccs(&mol),
        };
        Some(bits)
    }
}
