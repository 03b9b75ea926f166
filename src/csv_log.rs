//! append-only CSV log of accepted samples.
//!
//! the file is opened per row so a crash never loses more than the sample
//! in flight, and a later run keeps appending to the same file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::Sample;
use crate::error::CsvLogError;

pub const HEADER: &str = "Timestamp,Value";

#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// append one row, writing the header first if the file is new or empty
    pub fn append(&self, sample: &Sample) -> Result<(), CsvLogError> {
        let io_err = |source| CsvLogError::Io { path: self.path.display().to_string(), source };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        let needs_header = file.metadata().map_err(io_err)?.len() == 0;

        let mut row = String::new();
        if needs_header {
            row.push_str(HEADER);
            row.push('\n');
        }
        row.push_str(&format!("{},{}\n", sample.timestamp, sample.value));

        file.write_all(row.as_bytes()).map_err(io_err)?;
        Ok(())
    }
}
