//! Candle provider trait and structured error types.
//!
//! A provider hands the analyzer a raw candle table for one symbol. The
//! analyzer never fetches data itself; the batch scan and the CLI pick a
//! provider and pass the frame along.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::ingest;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data file for symbol {symbol} in {dir}")]
    NotFound { symbol: String, dir: String },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Source of candle tables, one symbol at a time.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Load the full candle table for `symbol`.
    fn fetch(&self, symbol: &str) -> Result<DataFrame, DataError>;
}

/// Reads `{dir}/{SYMBOL}.parquet` or `{dir}/{SYMBOL}.csv`, preferring Parquet.
#[derive(Debug, Clone)]
pub struct FileProvider {
    dir: PathBuf,
}

impl FileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file that would be read for `symbol`, if one exists.
    pub fn path_for(&self, symbol: &str) -> Option<PathBuf> {
        ["parquet", "csv"]
            .iter()
            .map(|ext| self.dir.join(format!("{symbol}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl CandleProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self, symbol: &str) -> Result<DataFrame, DataError> {
        let path = self.path_for(symbol).ok_or_else(|| DataError::NotFound {
            symbol: symbol.to_string(),
            dir: self.dir.display().to_string(),
        })?;
        ingest::read_table(&path)
    }
}
