//! Static record fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::Record;

/// Fixture shipped with the crate (24 records, fills the default grid).
pub const BUILTIN_FIXTURE: &str = include_str!("../data/records.json");

/// Errors emitted while loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("failed to read fixture {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The fixture was not a JSON array of `{ "age": number, "race": number }`.
    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered record sequence loaded once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    records: Vec<Record>,
}

impl Fixture {
    /// The embedded fixture.
    pub fn builtin() -> Result<Self, FixtureError> {
        Self::from_json_str(BUILTIN_FIXTURE)
    }

    /// Parse a JSON array of records. Unknown keys are ignored.
    pub fn from_json_str(input: &str) -> Result<Self, FixtureError> {
        let records: Vec<Record> = serde_json::from_str(input)?;
        Ok(Self { records })
    }

    /// Read and parse a fixture file.
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fixture = Self::from_json_str(&contents)?;
        info!(path = %path.display(), records = fixture.records.len(), "loaded fixture");
        Ok(fixture)
    }

    /// Records in fixture order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}
