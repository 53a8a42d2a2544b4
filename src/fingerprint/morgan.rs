//! Circular (Morgan / ECFP-like) fingerprints.
use fixedbitset::FixedBitSet;

use super::smiles::Molecule;


const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;


/// Hash a sequence of integers with 64-bit FNV-1a.
/// The result does not depend on the platform or the Rust release.
pub(crate) fn fnv1a(values: &[u64]) -> u64 {
    values.iter()
        .flat_map(|v| v.to_le_bytes())
        .fold(FNV_OFFSET, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
        })
}


/// Compute a Morgan fingerprint of `mol` folded into `n_bits` bits.
/// Every atom environment up to `radius` bonds sets one bit.
pub(crate) fn morgan(mol: &Molecule, radius: usize, n_bits: usize)
    -> FixedBitSet
{
    let mut bits = FixedBitSet::with_capacity(n_bits);
    if n_bits == 0 { return bits; }

    let in_ring = mol.ring_atoms();
    let mut identifiers = mol.atoms.iter()
        .enumerate()
        .map(|(i, atom)| {
            fnv1a(&[
                atom.number as u64,
                mol.degree(i) as u64,
                atom.hydrogens as u64,
                (atom.charge as i64) as u64,
                atom.aromatic as u64,
                in_ring[i] as u64,
            ])
        })
        .collect::<Vec<_>>();

    for &id in &identifiers {
        bits.insert((id % n_bits as u64) as usize);
    }

    for iteration in 1..=radius {
        identifiers = (0..mol.n_atoms())
            .map(|i| {
                let mut env = mol.neighbors(i)
                    .iter()
                    .map(|&(j, order)| (order.code(), identifiers[j]))
                    .collect::<Vec<_>>();
                env.sort_unstable();

                let mut key = Vec::with_capacity(2 + 2 * env.len());
                key.push(iteration as u64);
                key.push(identifiers[i]);
                key.extend(env.into_iter().flat_map(|(o, id)| [o, id]));
                fnv1a(&key)
            })
            .collect();

        for &id in &identifiers {
            bits.insert((id % n_bits as u64) as usize);
        }
    }

    bits
}


#[cfg(test)]
mod tests {
    use super::*;

    fn fp(smiles: &str) -> FixedBitSet {
        let mol = Molecule::parse(smiles).unwrap();
        morgan(&mol, 2, 1024)
    }

    #[test]
    fn identical_molecules_share_bits() {
        assert_eq!(fp("CCO"), fp("CCO"));
        assert_eq!(fp("OCC"), fp("CCO"));
    }

    #[test]
    fn different_molecules_differ() {
        assert_ne!(fp("CCO"), fp("CCN"));
        assert!(fp("c1ccccc1").count_ones(..) > 0);
    }

    #[test]
    fn radius_zero_sets_one_bit_per_atom_kind() {
        let butane = morgan(&Molecule::parse("CCCC").unwrap(), 0, 2048);
        let ethane = morgan(&Molecule::parse("CC").unwrap(), 0, 2048);
        // Terminal CH3 and inner CH2 carbons.
        assert!(butane.count_ones(..) <= 2);
        assert_eq!(ethane.count_ones(..), 1);
        assert!(ethane.is_subset(&butane));
    }
}
