use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{Result, ScreeningError};
use super::feature::Feature;
use super::sample_struct::Sample;


/// A table read from a CSV (optionally zip-compressed) file.
/// Every column is kept as text until it is converted
/// into fingerprints or labels,
/// so that long bit strings are never mistaken for integers.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
}


impl Table {
    /// Read the CSV file at `path`.
    /// If the extension is `.zip`, the first `.csv` entry of the archive
    /// is read instead.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ScreeningError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("cannot read input file {}", path.display()),
            )));
        }

        let is_zip = path.extension().is_some_and(|ext| ext == "zip");
        let df = if is_zip {
            let bytes = read_zip_entry(path)?;
            CsvReader::new(Cursor::new(bytes))
                .has_header(true)
                .infer_schema(Some(0))
                .finish()?
        } else {
            CsvReader::from_path(path)?
                .has_header(true)
                .infer_schema(Some(0))
                .finish()?
        };
        info!(path = %path.display(), rows = df.height(), "read table");
        Ok(Self { df })
    }


    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.df.height()
    }


    /// Returns `true` if the table has a column named `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_names().contains(&name)
    }


    /// Returns the raw text of column `name`.
    /// Missing cells are returned as `None`.
    pub fn text_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self.column(name)?
            .cast(&DataType::Utf8)?;
        let vals = series.utf8()?
            .into_iter()
            .map(|cell| {
                cell.map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect();
        Ok(vals)
    }


    /// Parse column `name` as numeric labels.
    /// Fails if a cell is missing or not a number.
    pub fn label_column(&self, name: &str) -> Result<Vec<f64>> {
        self.text_column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.as_deref()
                    .and_then(|s| s.parse::<f64>().ok())
                    .filter(|y| y.is_finite())
                    .ok_or_else(|| ScreeningError::DataShape(format!(
                        "label column `{name}` is not numeric at row {row} \
                         (got {cell:?})"
                    )))
            })
            .collect()
    }


    /// Drop the rows whose `name` cell is empty or missing.
    pub fn drop_missing(self, name: &str) -> Result<Self> {
        let mask = self.text_column(name)?
            .iter()
            .map(Option::is_some)
            .collect::<Vec<_>>();
        let n_dropped = mask.iter().filter(|keep| !**keep).count();
        if n_dropped > 0 {
            debug!(column = name, n_dropped, "dropped rows with missing value");
        }
        let mask = BooleanChunked::from_slice("mask", &mask);
        let df = self.df.filter(&mask)?;
        Ok(Self { df })
    }


    /// Parse column `name` as fingerprints.
    /// A cell is either a bit string (`0110...`)
    /// or numbers separated by whitespace, `;`, `|`, or `,`.
    /// All rows must have the same width.
    pub fn fingerprint_column(&self, name: &str, prefix: &str)
        -> Result<Sample>
    {
        let rows = self.text_column(name)?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.as_deref()
                    .and_then(parse_fingerprint)
                    .ok_or_else(|| ScreeningError::DataShape(format!(
                        "fingerprint column `{name}` cannot be parsed \
                         at row {row}"
                    )))
            })
            .collect::<Result<Vec<_>>>()?;

        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(row) = rows.iter().position(|r| r.len() != width) {
            return Err(ScreeningError::DataShape(format!(
                "fingerprint column `{name}` has {} values at row {row}, \
                 expected {width}",
                rows[row].len(),
            )));
        }

        let features = (0..width)
            .map(|j| {
                let vals = rows.iter().map(|r| r[j]).collect();
                Feature::from_values(format!("{prefix}_{j}"), vals)
            })
            .collect::<Vec<_>>();
        let mut sample = Sample::from_columns(features, Vec::new())?;
        sample.n_sample = rows.len();
        Ok(sample)
    }


    fn column(&self, name: &str) -> Result<&Series> {
        self.df.column(name)
            .map_err(|_| ScreeningError::DataShape(
                format!("column `{name}` does not exist")
            ))
    }
}


/// A builder that reads a fingerprint table into a labeled [`Sample`].
/// # Example
/// ```no_run
/// use vsboosts::prelude::*;
/// let sample = SampleReader::default()
///     .file("muv466_ecfp.csv.zip")
///     .fingerprint_column("fingerprint")
///     .target_feature("MUV-466")
///     .read()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct SampleReader {
    file: Option<PathBuf>,
    fingerprint: Option<String>,
    target: Option<String>,
}


impl SampleReader {
    /// Set the file name.
    pub fn file<P: AsRef<Path>>(mut self, file: P) -> Self {
        self.file = Some(file.as_ref().to_path_buf());
        self
    }


    /// Set the column that holds the fingerprints.
    pub fn fingerprint_column<S: ToString>(mut self, column: S) -> Self {
        self.fingerprint = Some(column.to_string());
        self
    }


    /// Set the column name that is used for target label.
    pub fn target_feature<S: ToString>(mut self, column: S) -> Self {
        self.target = Some(column.to_string());
        self
    }


    /// Reads the file based on the arguments.
    /// Rows with a missing target are dropped.
    pub fn read(self) -> Result<Sample> {
        let file = self.file
            .ok_or_else(|| ScreeningError::Config("the file is not set".into()))?;
        let fingerprint = self.fingerprint
            .ok_or_else(|| ScreeningError::Config(
                "the fingerprint column is not set".into()
            ))?;
        let target = self.target
            .ok_or_else(|| ScreeningError::Config(
                "the target column is not set".into()
            ))?;

        let table = Table::read(file)?.drop_missing(&target)?;
        let y = table.label_column(&target)?;
        table.fingerprint_column(&fingerprint, &fingerprint)?
            .with_target(y)
    }
}


/// Parse a single fingerprint cell.
pub(crate) fn parse_fingerprint(cell: &str) -> Option<Vec<f64>> {
    let cell = cell.trim();
    if cell.is_empty() { return None; }

    if cell.bytes().all(|b| b == b'0' || b == b'1') {
        let bits = cell.bytes()
            .map(|b| if b == b'1' { 1f64 } else { 0f64 })
            .collect();
        return Some(bits);
    }

    cell.split(|c: char| c.is_whitespace() || matches!(c, ';' | '|' | ','))
        .filter(|tok| !tok.is_empty())
        .map(|tok| tok.parse::<f64>().ok())
        .collect()
}


fn read_zip_entry(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut archive = ::zip::ZipArchive::new(file)?;

    let mut index = 0;
    for i in 0..archive.len() {
        if archive.by_index(i)?.name().ends_with(".csv") {
            index = i;
            break;
        }
    }

    let mut entry = archive.by_index(index)?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}
