use crate::rows::{RawCityRow, RawProductRow, validate_rows};
use landing_kit_core::{Dataset, Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Both tables as one JSON document on local disk.
///
/// The document shape mirrors the remote tables:
/// `{ "cities": [...], "products": [...] }`.
pub struct FileSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct FileTables {
    #[serde(default)]
    cities: Vec<RawCityRow>,
    #[serde(default)]
    products: Vec<RawProductRow>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the dataset.
    ///
    /// Returns the dataset plus the number of rows dropped by validation.
    /// An unreadable or malformed document is fatal; a bad row is not.
    pub fn load(&self) -> Result<(Dataset, usize)> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            Error::DataSource(format!("reading {}: {}", self.path.display(), e))
        })?;
        let tables: FileTables = serde_json::from_str(&content).map_err(|e| {
            Error::DataSource(format!("parsing {}: {}", self.path.display(), e))
        })?;
        Ok(validate_rows(tables.cities, tables.products))
    }
}
