//! Stratified k-fold assignment.
use colored::Colorize;
use polars::prelude::*;
use rand::prelude::*;
use tracing::info;

use std::fs::File;
use std::path::Path;

use crate::error::{Result, ScreeningError};
use crate::sample::Table;


/// Default number of folds.
pub const DEFAULT_N_FOLDS: usize = 4;
/// Default seed of the shuffle.
pub const DEFAULT_SEED: u64 = 2016;

const WIDTH: usize = 9;


/// A struct that assigns every example to one of `k` folds,
/// stratified by label.
///
/// Examples are grouped by exact label value;
/// classes are visited in ascending order and
/// the examples of each class are shuffled with a seeded RNG.
/// The concatenated order is dealt round-robin over the folds,
/// so fold sizes differ by at most one and
/// each class is spread over the folds as evenly as possible.
///
/// # Example
/// ```no_run
/// use vsboosts::prelude::*;
/// let labels = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
/// let folds = FoldGenerator::new(2)
///     .seed(777)
///     .generate(&labels)
///     .unwrap();
/// assert_eq!(folds.n_folds(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FoldGenerator {
    n_folds: usize,
    seed: u64,
    verbose: bool,
}


impl FoldGenerator {
    /// Construct a new instance of `FoldGenerator` with `n_folds` folds.
    pub fn new(n_folds: usize) -> Self {
        Self { n_folds, seed: DEFAULT_SEED, verbose: false, }
    }


    /// Set the seed of the randomness for shuffling.
    /// Default value is `2016`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// If `true`, prints the size and the class balance of every fold.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Assign a fold to each label in `labels`.
    pub fn generate(&self, labels: &[f64]) -> Result<FoldAssignment> {
        let k = self.n_folds;
        if k < 2 {
            return Err(ScreeningError::InvalidLabel(format!(
                "at least 2 folds are required, got {k}"
            )));
        }
        if let Some(y) = labels.iter().find(|y| !y.is_finite()) {
            return Err(ScreeningError::InvalidLabel(format!(
                "cannot stratify a non-finite label {y}"
            )));
        }

        let classes = classes_of(labels);
        if classes.len() < 2 {
            return Err(ScreeningError::InvalidLabel(format!(
                "stratification needs at least 2 classes, got {}",
                classes.len(),
            )));
        }
        if let Some((y, members)) = classes.iter()
            .find(|(_, members)| members.len() < k)
        {
            return Err(ScreeningError::InvalidLabel(format!(
                "class {y} has {} examples, fewer than {k} folds",
                members.len(),
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut folds = vec![0; labels.len()];
        let mut position = 0;
        for (_, mut members) in classes {
            members.shuffle(&mut rng);
            for i in members {
                folds[i] = position % k;
                position += 1;
            }
        }

        let assignment = FoldAssignment { folds, n_folds: k, seed: self.seed };
        info!(n_folds = k, seed = self.seed, n_examples = labels.len(), "generated folds");
        if self.verbose {
            assignment.print_summary(labels);
        }
        Ok(assignment)
    }
}


/// Groups the example indices by label, in ascending label order.
fn classes_of(labels: &[f64]) -> Vec<(f64, Vec<usize>)> {
    let mut order = (0..labels.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| labels[a].total_cmp(&labels[b]).then(a.cmp(&b)));

    let mut classes: Vec<(f64, Vec<usize>)> = Vec::new();
    for i in order {
        match classes.last_mut() {
            Some((y, members)) if *y == labels[i] => members.push(i),
            _ => classes.push((labels[i], vec![i])),
        }
    }
    classes
}


/// The fold id of every example.
/// Generated once and shared by every data bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldAssignment {
    folds: Vec<usize>,
    n_folds: usize,
    seed: u64,
}


impl FoldAssignment {
    /// Construct an assignment from explicit fold ids.
    pub fn from_folds(folds: Vec<usize>, n_folds: usize, seed: u64)
        -> Result<Self>
    {
        if n_folds < 2 {
            return Err(ScreeningError::InvalidLabel(format!(
                "at least 2 folds are required, got {n_folds}"
            )));
        }
        if let Some(f) = folds.iter().find(|&&f| f >= n_folds) {
            return Err(ScreeningError::DataShape(format!(
                "fold id {f} is out of range [0, {n_folds})"
            )));
        }
        Ok(Self { folds, n_folds, seed })
    }


    /// Returns the fold ids.
    pub fn folds(&self) -> &[usize] {
        &self.folds[..]
    }


    /// Returns the number of folds.
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }


    /// Returns the seed used to generate `self`.
    pub fn seed(&self) -> u64 {
        self.seed
    }


    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.folds.len()
    }


    /// Returns `true` if no example is assigned.
    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }


    /// Returns the indices of the examples in fold `fold`.
    pub fn members(&self, fold: usize) -> Vec<usize> {
        self.folds.iter()
            .enumerate()
            .filter_map(|(i, &f)| (f == fold).then_some(i))
            .collect()
    }


    /// Write `self` as a CSV file with columns `index,fold`.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let index = (0..self.folds.len() as u64).collect::<Vec<_>>();
        let folds = self.folds.iter().map(|&f| f as u64).collect::<Vec<_>>();
        let mut df = DataFrame::new(vec![
            Series::new("index", index),
            Series::new("fold", folds),
        ])?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).finish(&mut df)?;
        Ok(())
    }


    /// Read an assignment written by [`FoldAssignment::write_csv`].
    /// The number of folds is the largest fold id plus one.
    pub fn read_csv<P: AsRef<Path>>(path: P, seed: u64) -> Result<Self> {
        let table = Table::read(path)?;
        let index = table.label_column("index")?;
        let folds = table.label_column("fold")?;

        let mut assigned = vec![None; folds.len()];
        for (&i, &f) in index.iter().zip(&folds) {
            let valid = i >= 0.0 && f >= 0.0
                && i.fract() == 0.0 && f.fract() == 0.0
                && (i as usize) < assigned.len();
            if !valid {
                return Err(ScreeningError::DataShape(format!(
                    "invalid fold row `{i},{f}`"
                )));
            }
            assigned[i as usize] = Some(f as usize);
        }
        let folds = assigned.into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ScreeningError::DataShape(
                "the fold file does not cover every example".into()
            ))?;

        let n_folds = folds.iter().max().map_or(0, |&f| f + 1);
        Self::from_folds(folds, n_folds, seed)
    }


    fn print_summary(&self, labels: &[f64]) {
        for fold in 0..self.n_folds {
            let members = self.members(fold);
            let n_positive = members.iter()
                .filter(|&&i| labels[i] > 0.0)
                .count();
            println!(
                "{}    {}    {}",
                format!("  [{: >3}'th fold]", fold + 1).bold().red(),
                format!("[SIZE {:>WIDTH$}]", members.len()).bold().green(),
                format!("[POSITIVE {:>WIDTH$}]", n_positive).bold().yellow(),
            );
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_sorted_by_label() {
        let classes = classes_of(&[1.0, 0.0, 1.0, 2.0]);
        let labels = classes.iter().map(|(y, _)| *y).collect::<Vec<_>>();
        assert_eq!(labels, vec![0.0, 1.0, 2.0]);
        assert_eq!(classes[1].1, vec![0, 2]);
    }

    #[test]
    fn too_few_minority_examples() {
        let labels = [1.0, 0.0, 0.0, 0.0, 0.0];
        let err = FoldGenerator::new(2).generate(&labels).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidLabel(_)));
    }

    #[test]
    fn single_fold_is_rejected() {
        let labels = [1.0, 0.0, 1.0, 0.0];
        assert!(FoldGenerator::new(1).generate(&labels).is_err());
    }

    #[test]
    fn out_of_range_fold_ids_are_rejected() {
        assert!(FoldAssignment::from_folds(vec![0, 1, 2], 2, 0).is_err());
    }
}
