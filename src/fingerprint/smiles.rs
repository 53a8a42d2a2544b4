//! A small SMILES reader that builds the molecular graph
//! used by the built-in fingerprints.
//! Stereo marks are read and ignored.
use std::collections::{HashMap, VecDeque};


const ELEMENTS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];


/// Bond order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}


impl BondOrder {
    fn valence(self) -> u32 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
        }
    }


    pub(crate) fn code(self) -> u64 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
            Self::Aromatic => 5,
        }
    }
}


/// An atom of the molecular graph.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Atom {
    /// Atomic number; `0` for the wildcard `*`.
    pub(crate) number: u8,
    pub(crate) aromatic: bool,
    pub(crate) charge: i8,
    /// Explicit hydrogen count of a bracket atom.
    bracket_h: Option<u8>,
    /// Filled in after the bonds are known.
    pub(crate) hydrogens: u8,
}


impl Atom {
    pub(crate) fn symbol(&self) -> &'static str {
        if self.number == 0 { return "*"; }
        ELEMENTS[self.number as usize - 1]
    }


    pub(crate) fn is_halogen(&self) -> bool {
        matches!(self.number, 9 | 17 | 35 | 53)
    }
}


/// A bond between `atoms[a]` and `atoms[b]`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bond {
    pub(crate) a: usize,
    pub(crate) b: usize,
    pub(crate) order: BondOrder,
    /// `true` if this bond was written as a ring closure.
    pub(crate) closure: bool,
}


/// The molecular graph parsed from a SMILES string.
#[derive(Debug, Clone)]
pub(crate) struct Molecule {
    pub(crate) atoms: Vec<Atom>,
    pub(crate) bonds: Vec<Bond>,
    adjacency: Vec<Vec<(usize, BondOrder)>>,
    n_components: usize,
}


impl Molecule {
    /// Parse `smiles`.
    /// Returns `None` if the string is not a valid SMILES.
    pub(crate) fn parse(smiles: &str) -> Option<Self> {
        Parser::new(smiles).parse()
    }


    pub(crate) fn n_atoms(&self) -> usize {
        self.atoms.len()
    }


    pub(crate) fn neighbors(&self, atom: usize) -> &[(usize, BondOrder)] {
        &self.adjacency[atom]
    }


    pub(crate) fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }


    /// Number of disconnected fragments.
    pub(crate) fn n_components(&self) -> usize {
        self.n_components
    }


    /// Returns the size of the smallest ring closed by each ring-closure bond.
    pub(crate) fn ring_sizes(&self) -> Vec<(usize, bool)> {
        self.bonds.iter()
            .enumerate()
            .filter(|(_, bond)| bond.closure)
            .filter_map(|(k, bond)| {
                let len = self.shortest_path_without(bond.a, bond.b, k)?;
                let aromatic = self.atoms[bond.a].aromatic
                    && self.atoms[bond.b].aromatic;
                Some((len + 1, aromatic))
            })
            .collect()
    }


    /// Returns `true` for every atom that lies on a cycle.
    pub(crate) fn ring_atoms(&self) -> Vec<bool> {
        let mut in_ring = vec![false; self.atoms.len()];
        for (k, bond) in self.bonds.iter().enumerate() {
            if self.shortest_path_without(bond.a, bond.b, k).is_some() {
                in_ring[bond.a] = true;
                in_ring[bond.b] = true;
            }
        }
        in_ring
    }


    /// Breadth-first search from `src` to `dst` ignoring bond `skip`.
    fn shortest_path_without(&self, src: usize, dst: usize, skip: usize)
        -> Option<usize>
    {
        let skipped = &self.bonds[skip];
        let mut dist = vec![usize::MAX; self.atoms.len()];
        dist[src] = 0;
        let mut queue = VecDeque::from([src]);
        while let Some(u) = queue.pop_front() {
            for &(v, _) in &self.adjacency[u] {
                let is_skipped = (u == skipped.a && v == skipped.b)
                    || (u == skipped.b && v == skipped.a);
                if is_skipped || dist[v] != usize::MAX { continue; }
                dist[v] = dist[u] + 1;
                if v == dst { return Some(dist[v]); }
                queue.push_back(v);
            }
        }
        None
    }
}


struct Parser {
    chars: Vec<char>,
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    rings: HashMap<u32, (usize, Option<BondOrder>)>,
    branches: Vec<Option<usize>>,
    prev: Option<usize>,
    pending: Option<BondOrder>,
    n_components: usize,
}


impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.trim().chars().collect(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            rings: HashMap::new(),
            branches: Vec::new(),
            prev: None,
            pending: None,
            n_components: 1,
        }
    }


    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }


    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }


    fn parse(mut self) -> Option<Molecule> {
        if self.chars.is_empty() { return None; }

        while let Some(c) = self.peek() {
            match c {
                '(' => {
                    self.bump();
                    self.prev?;
                    self.branches.push(self.prev);
                },
                ')' => {
                    self.bump();
                    if self.pending.is_some() { return None; }
                    self.prev = self.branches.pop()?;
                },
                '-' | '/' | '\\' => { self.bond(BondOrder::Single)?; },
                '=' => { self.bond(BondOrder::Double)?; },
                '#' => { self.bond(BondOrder::Triple)?; },
                '$' => { self.bond(BondOrder::Quadruple)?; },
                ':' => { self.bond(BondOrder::Aromatic)?; },
                '.' => {
                    self.bump();
                    if self.pending.is_some() || self.prev.is_none() {
                        return None;
                    }
                    self.prev = None;
                    self.n_components += 1;
                },
                '%' | '0'..='9' => {
                    let label = self.ring_label()?;
                    self.ring_closure(label)?;
                },
                '[' => {
                    let atom = self.bracket_atom()?;
                    self.add_atom(atom)?;
                },
                _ => {
                    let atom = self.organic_atom()?;
                    self.add_atom(atom)?;
                },
            }
        }

        let complete = self.branches.is_empty()
            && self.rings.is_empty()
            && self.pending.is_none()
            && !self.atoms.is_empty();
        if !complete { return None; }

        Some(self.finish())
    }


    fn bond(&mut self, order: BondOrder) -> Option<()> {
        self.bump();
        if self.pending.is_some() || self.prev.is_none() { return None; }
        self.pending = Some(order);
        Some(())
    }


    fn ring_label(&mut self) -> Option<u32> {
        match self.bump()? {
            '%' => {
                let hi = self.bump()?.to_digit(10)?;
                let lo = self.bump()?.to_digit(10)?;
                Some(hi * 10 + lo)
            },
            c => c.to_digit(10),
        }
    }


    fn ring_closure(&mut self, label: u32) -> Option<()> {
        let current = self.prev?;
        let order = self.pending.take();
        match self.rings.remove(&label) {
            Some((open, open_order)) => {
                if open == current { return None; }
                let order = match (open_order, order) {
                    (Some(x), Some(y)) if x != y => return None,
                    (Some(x), _) | (None, Some(x)) => x,
                    (None, None) => self.default_order(open, current),
                };
                self.bonds.push(Bond { a: open, b: current, order, closure: true });
            },
            None => {
                self.rings.insert(label, (current, order));
            },
        }
        Some(())
    }


    fn add_atom(&mut self, atom: Atom) -> Option<()> {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        if let Some(prev) = self.prev {
            let order = self.pending.take()
                .unwrap_or_else(|| self.default_order(prev, idx));
            self.bonds.push(Bond { a: prev, b: idx, order, closure: false });
        } else if self.pending.is_some() {
            return None;
        }
        self.prev = Some(idx);
        Some(())
    }


    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }


    fn organic_atom(&mut self) -> Option<Atom> {
        let c = self.bump()?;
        let (symbol, aromatic) = match c {
            'C' if self.peek() == Some('l') => { self.bump(); ("Cl", false) },
            'B' if self.peek() == Some('r') => { self.bump(); ("Br", false) },
            'B' => ("B", false),
            'C' => ("C", false),
            'N' => ("N", false),
            'O' => ("O", false),
            'P' => ("P", false),
            'S' => ("S", false),
            'F' => ("F", false),
            'I' => ("I", false),
            'b' => ("B", true),
            'c' => ("C", true),
            'n' => ("N", true),
            'o' => ("O", true),
            'p' => ("P", true),
            's' => ("S", true),
            '*' => ("*", false),
            _ => return None,
        };
        Some(Atom {
            number: atomic_number(symbol)?,
            aromatic,
            charge: 0,
            bracket_h: None,
            hydrogens: 0,
        })
    }


    fn bracket_atom(&mut self) -> Option<Atom> {
        self.bump();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }

        let first = self.bump()?;
        let (symbol, aromatic) = if first == '*' {
            ("*".to_string(), false)
        } else if first.is_ascii_lowercase() {
            // Two-letter aromatic symbols: se, as, te.
            let mut sym = first.to_ascii_uppercase().to_string();
            if let Some(next) = self.peek() {
                let two = format!("{sym}{next}");
                if matches!(two.as_str(), "Se" | "As" | "Te") {
                    self.bump();
                    sym = two;
                }
            }
            (sym, true)
        } else if first.is_ascii_uppercase() {
            let mut sym = first.to_string();
            if let Some(next) = self.peek().filter(char::is_ascii_lowercase) {
                let two = format!("{sym}{next}");
                if atomic_number(&two).is_some() {
                    self.bump();
                    sym = two;
                }
            }
            (sym, false)
        } else {
            return None;
        };
        let number = atomic_number(&symbol)?;

        while self.peek() == Some('@') { self.bump(); }

        let mut bracket_h = 0u8;
        if self.peek() == Some('H') {
            self.bump();
            bracket_h = u8::try_from(self.count()?).ok()?;
        }

        let mut charge = 0i32;
        while let Some(c @ ('+' | '-')) = self.peek() {
            self.bump();
            let magnitude = i32::try_from(self.count()?).ok()?;
            charge = if c == '+' {
                charge.checked_add(magnitude)?
            } else {
                charge.checked_sub(magnitude)?
            };
        }
        let charge = i8::try_from(charge).ok()?;

        if self.peek() == Some(':') {
            self.bump();
            self.digits()?;
        }

        if self.bump()? != ']' { return None; }

        Some(Atom {
            number,
            aromatic,
            charge,
            bracket_h: Some(bracket_h),
            hydrogens: 0,
        })
    }


    /// An optional count after `H`, `+` or `-`; absent means 1.
    /// `None` if the digits do not fit in a `u32`.
    fn count(&mut self) -> Option<u32> {
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.digits()
        } else {
            Some(1)
        }
    }


    fn digits(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        self.chars[start..self.pos].iter()
            .collect::<String>()
            .parse()
            .ok()
    }


    fn finish(self) -> Molecule {
        let n_atoms = self.atoms.len();
        let mut adjacency = vec![Vec::new(); n_atoms];
        for bond in &self.bonds {
            adjacency[bond.a].push((bond.b, bond.order));
            adjacency[bond.b].push((bond.a, bond.order));
        }

        let mut atoms = self.atoms;
        for (i, atom) in atoms.iter_mut().enumerate() {
            atom.hydrogens = match atom.bracket_h {
                Some(h) => h,
                None => implicit_hydrogens(atom, &adjacency[i]),
            };
        }

        Molecule {
            atoms,
            bonds: self.bonds,
            adjacency,
            n_components: self.n_components,
        }
    }
}


fn atomic_number(symbol: &str) -> Option<u8> {
    if symbol == "*" { return Some(0); }
    ELEMENTS.iter()
        .position(|&s| s == symbol)
        .map(|p| p as u8 + 1)
}


/// Implicit hydrogens of an organic-subset atom.
fn implicit_hydrogens(atom: &Atom, bonds: &[(usize, BondOrder)]) -> u8 {
    let valences: &[u32] = match atom.number {
        5 => &[3],
        6 => &[4],
        7 => &[3, 5],
        8 => &[2],
        15 => &[3, 5],
        16 => &[2, 4, 6],
        9 | 17 | 35 | 53 => &[1],
        _ => return 0,
    };
    let mut used = bonds.iter()
        .map(|(_, order)| order.valence())
        .sum::<u32>();
    if atom.aromatic { used += 1; }

    valences.iter()
        .find(|&&v| v >= used)
        .map(|&v| (v - used) as u8)
        .unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethanol_has_three_heavy_atoms() {
        let mol = Molecule::parse("CCO").unwrap();
        assert_eq!(mol.n_atoms(), 3);
        assert_eq!(mol.bonds.len(), 2);
        assert_eq!(mol.atoms[0].hydrogens, 3);
        assert_eq!(mol.atoms[2].hydrogens, 1);
    }

    #[test]
    fn benzene_is_one_aromatic_six_ring() {
        let mol = Molecule::parse("c1ccccc1").unwrap();
        assert_eq!(mol.ring_sizes(), vec![(6, true)]);
        assert!(mol.atoms.iter().all(|a| a.hydrogens == 1));
        assert!(mol.ring_atoms().iter().all(|&r| r));
    }

    #[test]
    fn bracket_atoms_and_charges() {
        let mol = Molecule::parse("C[NH3+].[Cl-]").unwrap();
        assert_eq!(mol.n_components(), 2);
        assert_eq!(mol.atoms[1].charge, 1);
        assert_eq!(mol.atoms[1].hydrogens, 3);
        assert_eq!(mol.atoms[2].symbol(), "Cl");
    }

    #[test]
    fn malformed_strings_are_rejected() {
        for smiles in ["", "C(C", "C1CC", "C)", "Xx", "C==C", "[C", "CC("] {
            assert!(Molecule::parse(smiles).is_none(), "{smiles}");
        }
    }

    #[test]
    fn out_of_range_counts_are_rejected() {
        for smiles in ["[C+99+99]", "[C-99-99]", "[CH300]", "[C+99999999999]", "[CH99999999999]"] {
            assert!(Molecule::parse(smiles).is_none(), "{smiles}");
        }
        let mol = Molecule::parse("[O--]").unwrap();
        assert_eq!(mol.atoms[0].charge, -2);
        let mol = Molecule::parse("[Fe+3]").unwrap();
        assert_eq!(mol.atoms[0].charge, 3);
    }
}
