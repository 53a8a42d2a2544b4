//! MACCS-like structural keys.
//!
//! The key numbering follows the public 166-key MACCS table
//! (bit `0` is unused, so the vector has 167 bits).
//! Only keys expressible as atom, bond, and ring counts are evaluated.
use fixedbitset::FixedBitSet;

use super::smiles::{BondOrder, Molecule};


/// Width of the MACCS key vector.
pub const MACCS_BITS: usize = 167;


#[derive(Default)]
struct Counts {
    nitrogen: usize,
    oxygen: usize,
    fluorine: usize,
    chlorine: usize,
    bromine: usize,
    iodine: usize,
    sulfur: usize,
    phosphorus: usize,
    halogen: usize,
    charged: usize,
    methyl: usize,
    hydroxyl: usize,
    primary_amine: usize,
    heteroatom_with_h: usize,
    carbonyl: usize,
    carbon_nitrogen: usize,
    carbon_oxygen: usize,
    carbon_carbon_double: usize,
    triple: usize,
    ring_nitrogen: usize,
    ring_heteroatom: usize,
}


fn count(mol: &Molecule) -> Counts {
    let in_ring = mol.ring_atoms();
    let mut c = Counts::default();

    for (i, atom) in mol.atoms.iter().enumerate() {
        match atom.number {
            7 => c.nitrogen += 1,
            8 => c.oxygen += 1,
            9 => c.fluorine += 1,
            15 => c.phosphorus += 1,
            16 => c.sulfur += 1,
            17 => c.chlorine += 1,
            35 => c.bromine += 1,
            53 => c.iodine += 1,
            _ => {},
        }
        if atom.is_halogen() { c.halogen += 1; }
        if atom.charge != 0 { c.charged += 1; }

        let hetero = !matches!(atom.number, 0 | 1 | 6);
        if hetero && atom.hydrogens > 0 { c.heteroatom_with_h += 1; }
        if atom.number == 6 && atom.hydrogens == 3 { c.methyl += 1; }
        if atom.number == 8 && atom.hydrogens == 1 { c.hydroxyl += 1; }
        if atom.number == 7 && atom.hydrogens == 2 { c.primary_amine += 1; }
        if in_ring[i] && atom.number == 7 { c.ring_nitrogen += 1; }
        if in_ring[i] && hetero { c.ring_heteroatom += 1; }
    }

    for bond in &mol.bonds {
        let (a, b) = (&mol.atoms[bond.a], &mol.atoms[bond.b]);
        let pair = (a.number.min(b.number), a.number.max(b.number));
        match (pair, bond.order) {
            ((6, 8), BondOrder::Double) => {
                c.carbonyl += 1;
                c.carbon_oxygen += 1;
            },
            ((6, 6), BondOrder::Double) => c.carbon_carbon_double += 1,
            ((6, 7), _) => c.carbon_nitrogen += 1,
            ((6, 8), _) => c.carbon_oxygen += 1,
            _ => {},
        }
        if bond.order == BondOrder::Triple { c.triple += 1; }
    }
    c
}


/// Compute the MACCS-like keys of `mol`.
pub(crate) fn maccs(mol: &Molecule) -> FixedBitSet {
    let mut bits = FixedBitSet::with_capacity(MACCS_BITS);
    let c = count(mol);
    let rings = mol.ring_sizes();
    let n_rings_of = |size: usize| rings.iter().filter(|(s, _)| *s == size).count();
    let n_aromatic = rings.iter().filter(|(_, aromatic)| *aromatic).count();

    let keys: [(usize, bool); 33] = [
        (11, n_rings_of(4) > 0),
        (22, n_rings_of(3) > 0),
        (29, c.phosphorus > 0),
        (42, c.fluorine > 0),
        (46, c.bromine > 0),
        (49, c.charged > 0),
        (84, c.primary_amine > 0),
        (88, c.sulfur > 0),
        (96, n_rings_of(5) > 0),
        (101, rings.iter().any(|(s, _)| *s >= 8)),
        (103, c.chlorine > 0),
        (107, c.iodine > 0),
        (121, c.ring_nitrogen > 0),
        (125, n_aromatic > 1),
        (131, c.heteroatom_with_h > 1),
        (134, c.halogen > 0),
        (136, c.carbonyl > 1),
        (137, c.ring_heteroatom > 0),
        (139, c.hydroxyl > 0),
        (142, c.nitrogen > 1),
        (143, c.carbon_carbon_double > 0),
        (145, n_rings_of(6) > 1),
        (146, c.oxygen > 2),
        (149, c.methyl > 1),
        (150, c.triple > 0),
        (154, c.carbonyl > 0),
        (157, c.carbon_oxygen > 0),
        (158, c.carbon_nitrogen > 0),
        (159, c.oxygen > 1),
        (160, c.methyl > 0),
        (161, c.nitrogen > 0),
        (163, n_rings_of(6) > 0),
        (164, c.oxygen > 0),
    ];

    for (key, on) in keys {
        if on { bits.insert(key); }
    }
    if n_aromatic > 0 { bits.insert(162); }
    if !rings.is_empty() { bits.insert(165); }
    if mol.n_components() > 1 { bits.insert(166); }

    bits
}
