use std::fs::File;
use std::io::Write;

use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};

use vsboosts::prelude::*;
use vsboosts::sample::Table;


const CSV: &str = "\
id,fingerprint,active
a,0011,1
b,0101,
c,1100,0
";


fn write_zip(path: &std::path::Path, entries: &[(&str, &str)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated);
    for (name, text) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(text.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}


/// Tests for reading compressed tables.
#[cfg(test)]
pub mod zipped_input {
    use super::*;

    #[test]
    fn the_csv_entry_of_an_archive_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv.zip");
        write_zip(&path, &[("README.txt", "not a table"), ("train.csv", CSV)]);

        let sample = SampleReader::default()
            .file(&path)
            .fingerprint_column("fingerprint")
            .target_feature("active")
            .read()
            .unwrap();
        assert_eq!(sample.shape(), (2, 4));
        assert_eq!(sample.target(), &[1.0, 0.0]);

        let table = Table::read(&path).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert!(table.has_column("fingerprint"));
    }

    #[test]
    fn a_broken_archive_is_a_zip_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, "this is not an archive").unwrap();
        let err = Table::read(&path).unwrap_err();
        assert!(matches!(err, ScreeningError::Zip(_)));
    }
}
