//! CSV loading utilities

use crate::error::{KesslerError, Result};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Loader for CDM batches stored as CSV with a header row.
pub struct CdmLoader {
    /// Rows to scan for schema inference
    infer_schema_length: Option<usize>,
}

impl Default for CdmLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CdmLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(100),
        }
    }

    /// Set the number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path)?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file);

        reader.finish().map_err(KesslerError::from)
    }

    /// Load a CSV file restricted to the given columns, failing fast when
    /// any of them is absent.
    pub fn load_csv_columns(&self, path: impl AsRef<Path>, columns: &[&str]) -> Result<DataFrame> {
        let df = self.load_csv(path)?;
        require_columns(&df, columns)?;
        df.select(columns.iter().copied())
            .map_err(KesslerError::from)
    }
}

/// Verify that every required column is present, reporting all missing
/// columns by name.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    let present: HashSet<&str> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !present.contains(name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(KesslerError::MissingColumn(missing.join(", ")))
    }
}

/// Save a frame as CSV with a header row.
pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path)?;

    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(KesslerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "event_id,time_to_tca,risk").unwrap();
        writeln!(file, "1,5.0,-7.2").unwrap();
        writeln!(file, "1,2.5,-6.1").unwrap();
        writeln!(file, "2,3.0,-4.0").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = CdmLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_load_csv_columns_projects() {
        let file = create_test_csv();
        let df = CdmLoader::new()
            .load_csv_columns(file.path(), &["event_id", "risk"])
            .unwrap();

        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_missing_columns_named_in_error() {
        let file = create_test_csv();
        let err = CdmLoader::new()
            .load_csv_columns(file.path(), &["risk", "miss_distance", "c_object_type"])
            .unwrap_err();

        match err {
            KesslerError::MissingColumn(msg) => {
                assert!(msg.contains("miss_distance"));
                assert!(msg.contains("c_object_type"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_save_round_trip() {
        let mut df = DataFrame::new(vec![
            Column::new("a".into(), &[1.0, 2.0]),
            Column::new("b".into(), &[3.0, 4.0]),
        ])
        .unwrap();

        let file = NamedTempFile::new().unwrap();
        save_csv(&mut df, file.path()).unwrap();

        let loaded = CdmLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(loaded.height(), 2);
        assert_eq!(loaded.width(), 2);
    }
}
